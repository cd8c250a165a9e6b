use clap::{Parser, Subcommand};
use log::warn;
use qrsweaver::csv_utils::{read_ecg_data, to_signal, write_positions_to_file};
use qrsweaver::edf_utils::describe_edf;
use qrsweaver::{QrsDetector, QrsError};
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "qrsweaver", about = "Pan-Tompkins QRS detection for ECG recordings")]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect R-peaks in a `time,voltage` CSV record
    Detect {
        #[arg(default_value = "ecg.csv")]
        input: PathBuf,
        /// File receiving one R-peak time (seconds) per line
        #[arg(short, long, default_value = "positions.txt")]
        output: PathBuf,
        /// Sampling rate in Hz, instead of the one implied by the time column
        #[arg(long)]
        fs: Option<f64>,
        /// Also write a JSON report
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Print the headers and data block of an EDF file
    EdfInfo { file: String },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Detect {
            input,
            output,
            fs,
            json,
        } => {
            println!("Reading from: {:?}", input);
            let ecg_data = read_ecg_data(&input)?;
            if ecg_data.is_empty() {
                println!("No data found in the ECG file");
                return Ok(());
            }

            let signal = to_signal(&ecg_data, fs)?;
            println!("Sampling frequency: {:.2} Hz", signal.fs());

            // detecting QRS complexes
            let detection = QrsDetector::new().detect(&signal);
            let times = detection.r_peak_times();

            println!("Writing to: {:?}", output);
            println!("Found {} QRS complexes", times.len());
            write_positions_to_file(&times, &output)?;

            match detection.heart_rate() {
                Ok(hr) => println!(
                    "Heart rate: {:.2} BPM (median {:.2} BPM over {} beats)",
                    hr.mean_bpm, hr.median_bpm, hr.beat_count
                ),
                Err(QrsError::InsufficientData { needed, found }) => {
                    warn!(
                        "heart rate needs {needed} peaks after the learning window, found {found}"
                    )
                }
                Err(e) => return Err(e.into()),
            }

            if let Some(path) = json {
                let writer = BufWriter::new(File::create(&path)?);
                serde_json::to_writer_pretty(writer, &detection.summary())
                    .map_err(QrsError::from)?;
                println!("Report written to: {:?}", path);
            }

            println!("Detection complete.");
        }
        Commands::EdfInfo { file } => {
            println!("{}", describe_edf(&file)?);
        }
    }
    Ok(())
}
