//! Heart rate from a detected R-peak set.

use crate::error::{QrsError, Result};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct HeartRateConfig {
    /// Peaks before this time (seconds) are learning-phase artifacts
    pub learning_window_sec: f64,
    /// Minimum number of usable peaks (at least two for one interval)
    pub min_peaks: usize,
}

impl Default for HeartRateConfig {
    fn default() -> Self {
        Self {
            learning_window_sec: 0.5,
            min_peaks: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeartRate {
    /// `fs * 60 / mean(RR in samples)`
    pub mean_bpm: f64,
    pub median_bpm: f64,
    pub rr_intervals_sec: Vec<f64>,
    pub beat_count: usize,
}

impl HeartRate {
    pub fn from_peaks(peaks: &[usize], fs: f64) -> Result<Self> {
        Self::with_config(peaks, fs, &HeartRateConfig::default())
    }

    /// `peaks` must be sorted and duplicate-free, as produced by the detector.
    pub fn with_config(peaks: &[usize], fs: f64, cfg: &HeartRateConfig) -> Result<Self> {
        if !fs.is_finite() || fs <= 0.0 {
            return Err(QrsError::InvalidInput(format!(
                "sampling rate must be positive and finite, got {fs}"
            )));
        }
        let cutoff = cfg.learning_window_sec * fs;
        let usable: Vec<usize> = peaks.iter().copied().filter(|&p| p as f64 > cutoff).collect();
        let needed = cfg.min_peaks.max(2);
        if usable.len() < needed {
            return Err(QrsError::InsufficientData {
                needed,
                found: usable.len(),
            });
        }

        let diffs: Vec<f64> = usable.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
        let mean = diffs.iter().sum::<f64>() / diffs.len() as f64;

        let mut sorted = diffs.clone();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            0.5 * (sorted[mid - 1] + sorted[mid])
        } else {
            sorted[mid]
        };

        Ok(Self {
            mean_bpm: fs * 60.0 / mean,
            median_bpm: fs * 60.0 / median,
            rr_intervals_sec: diffs.iter().map(|d| d / fs).collect(),
            beat_count: usable.len(),
        })
    }
}
