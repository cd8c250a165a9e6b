//! Validated raw ECG buffer with its time base.

use crate::error::{QrsError, Result};

/// Uniformly sampled ECG signal.
///
/// Construction checks that the buffer is non-empty, every sample is finite
/// and the sampling rate is a positive finite number. The samples are never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    samples: Vec<f64>,
    fs: f64,
}

impl Signal {
    pub fn new(samples: Vec<f64>, fs: f64) -> Result<Self> {
        validate(&samples, fs)?;
        Ok(Self { samples, fs })
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Sampling rate in Hz
    pub fn fs(&self) -> f64 {
        self.fs
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_sec(&self) -> f64 {
        self.samples.len() as f64 / self.fs
    }

    /// Time in seconds of the sample at `index`.
    pub fn time_of(&self, index: usize) -> f64 {
        index as f64 / self.fs
    }
}

/// Checks a raw buffer and sampling rate without taking ownership.
pub fn validate(samples: &[f64], fs: f64) -> Result<()> {
    if !fs.is_finite() || fs <= 0.0 {
        return Err(QrsError::InvalidInput(format!(
            "sampling rate must be positive and finite, got {fs}"
        )));
    }
    if samples.is_empty() {
        return Err(QrsError::InvalidInput("signal is empty".to_string()));
    }
    if let Some(pos) = samples.iter().position(|v| !v.is_finite()) {
        return Err(QrsError::InvalidInput(format!(
            "non-finite sample {} at index {pos}",
            samples[pos]
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_signal() {
        let err = Signal::new(Vec::new(), 360.0).unwrap_err();
        assert!(matches!(err, QrsError::InvalidInput(_)));
    }

    #[test]
    fn rejects_bad_sampling_rate() {
        for fs in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = Signal::new(vec![0.0; 10], fs).unwrap_err();
            assert!(matches!(err, QrsError::InvalidInput(_)), "fs={fs}");
        }
    }

    #[test]
    fn rejects_non_finite_samples() {
        let err = Signal::new(vec![0.0, 1.0, f64::NAN], 100.0).unwrap_err();
        assert!(err.to_string().contains("index 2"));
        assert!(Signal::new(vec![f64::NEG_INFINITY], 100.0).is_err());
    }

    #[test]
    fn time_base() {
        let signal = Signal::new(vec![0.0; 720], 360.0).unwrap();
        assert_eq!(signal.len(), 720);
        assert_eq!(signal.duration_sec(), 2.0);
        assert_eq!(signal.time_of(180), 0.5);
    }
}
