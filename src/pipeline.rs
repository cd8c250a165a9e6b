//! End-to-end R-peak detection: filters, candidates, decisions, refinement.

use crate::candidates::find_candidates;
use crate::detector::{self, Decision, DetectorOutcome};
use crate::error::Result;
use crate::filters::FilterStages;
use crate::heart_rate::HeartRate;
use crate::refine::refine_peaks;
use crate::signal::{self, Signal};
use log::{info, warn};
use serde::Serialize;

/// Stateless Pan-Tompkins detector. Every call to [`QrsDetector::detect`]
/// builds and discards its own detector state.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrsDetector;

/// Intermediate and final artifacts of one run.
#[derive(Debug, Clone)]
pub struct QrsDetection {
    pub fs: f64,
    pub stages: FilterStages,
    pub candidates: Vec<usize>,
    pub outcome: DetectorOutcome,
    /// Strictly increasing R-peak indices into the raw signal
    pub r_peaks: Vec<usize>,
}

impl QrsDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn detect(&self, signal: &Signal) -> QrsDetection {
        run(signal.samples(), signal.fs())
    }

    /// Validates `samples`/`fs` and runs the detector on a borrowed buffer.
    pub fn detect_slice(&self, samples: &[f64], fs: f64) -> Result<QrsDetection> {
        signal::validate(samples, fs)?;
        Ok(run(samples, fs))
    }
}

fn run(samples: &[f64], fs: f64) -> QrsDetection {
    let stages = FilterStages::compute(samples, fs);
    let candidates = find_candidates(&stages.integrated, fs);
    if candidates.is_empty() {
        warn!("no QRS candidates in {} samples", samples.len());
    }

    let outcome = detector::detect(&stages.integrated, &stages.bandpass, &candidates, fs);
    let r_peaks = refine_peaks(samples, &outcome.r_locations, fs);
    info!(
        "detected {} R-peaks from {} candidates ({:.1}s at {} Hz)",
        r_peaks.len(),
        candidates.len(),
        samples.len() as f64 / fs,
        fs
    );

    QrsDetection {
        fs,
        stages,
        candidates,
        outcome,
        r_peaks,
    }
}

/// Sorted, duplicate-free R-peak indices of `samples` sampled at `fs` Hz.
pub fn detect_r_peaks(samples: &[f64], fs: f64) -> Result<Vec<usize>> {
    Ok(QrsDetector::new().detect_slice(samples, fs)?.r_peaks)
}

impl QrsDetection {
    pub fn r_peak_times(&self) -> Vec<f64> {
        self.r_peaks.iter().map(|&i| i as f64 / self.fs).collect()
    }

    pub fn heart_rate(&self) -> Result<HeartRate> {
        HeartRate::from_peaks(&self.r_peaks, self.fs)
    }

    pub fn summary(&self) -> DetectionSummary {
        DetectionSummary {
            sampling_rate: self.fs,
            sample_count: self.stages.len(),
            candidate_count: self.candidates.len(),
            search_back_count: self.outcome.search_back.len(),
            t_wave_count: self.outcome.count(Decision::TWave),
            r_peaks: self.r_peaks.clone(),
            r_peak_times: self.r_peak_times(),
            heart_rate: self.heart_rate().ok(),
        }
    }
}

/// Serializable report of a run.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionSummary {
    pub sampling_rate: f64,
    pub sample_count: usize,
    pub candidate_count: usize,
    pub search_back_count: usize,
    pub t_wave_count: usize,
    pub r_peaks: Vec<usize>,
    pub r_peak_times: Vec<f64>,
    pub heart_rate: Option<HeartRate>,
}
