use crate::error::{QrsError, Result};
use crate::signal::Signal;
use log::{debug, info};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Sampling period assumed when a record has a single row (200 Hz).
const DEFAULT_SAMPLE_PERIOD: f64 = 0.005;

// basic structure to hold our ECG data points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EcgPoint {
    pub time: f64,
    pub voltage: f64,
}

pub fn read_ecg_data<P: AsRef<Path>>(path: P) -> Result<Vec<EcgPoint>> {
    let file = File::open(path.as_ref())?;
    let data = parse_ecg_data(BufReader::new(file))?;

    if !data.is_empty() {
        info!("read {} data points from {}", data.len(), path.as_ref().display());
    }
    Ok(data)
}

/// Parses `time,voltage` rows after a single header line.
///
/// Rows with a different number of fields are skipped; a row with two fields
/// that do not parse as numbers is an error.
pub fn parse_ecg_data<R: BufRead>(reader: R) -> Result<Vec<EcgPoint>> {
    let mut data = Vec::new();

    // skipping the header
    for (idx, line) in reader.lines().enumerate().skip(1) {
        let line = line?;
        let line_no = idx + 1;

        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() != 2 {
            if !line.trim().is_empty() {
                debug!("skipping line {line_no}: expected 2 fields, got {}", parts.len());
            }
            continue;
        }

        let time = parse_field(parts[0], line_no, "time")?;
        let voltage = parse_field(parts[1], line_no, "voltage")?;
        data.push(EcgPoint { time, voltage });
    }

    Ok(data)
}

fn parse_field(field: &str, line: usize, name: &str) -> Result<f64> {
    field.trim().parse::<f64>().map_err(|e| QrsError::Parse {
        line,
        reason: format!("bad {name} value {:?}: {e}", field.trim()),
    })
}

/// Sampling rate implied by the spacing of the first two time stamps.
pub fn sampling_rate(data: &[EcgPoint]) -> Result<f64> {
    let period = if data.len() > 1 {
        data[1].time - data[0].time
    } else {
        DEFAULT_SAMPLE_PERIOD
    };
    if !(period.is_finite() && period > 0.0) {
        return Err(QrsError::InvalidInput(format!(
            "time column must increase, first step is {period}"
        )));
    }
    Ok(1.0 / period)
}

/// Builds a validated [`Signal`] from loaded points; `fs` overrides the rate
/// derived from the time column.
pub fn to_signal(data: &[EcgPoint], fs: Option<f64>) -> Result<Signal> {
    let fs = match fs {
        Some(fs) => fs,
        None => sampling_rate(data)?,
    };
    Signal::new(data.iter().map(|p| p.voltage).collect(), fs)
}

/// Writes one position per line with six decimals.
pub fn write_positions_to_file<P: AsRef<Path>>(positions: &[f64], path: P) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    for &pos in positions {
        writeln!(file, "{:.6}", pos)?;
    }
    file.flush()?;

    Ok(())
}
