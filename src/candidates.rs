//! Coarse QRS candidates from the integrated signal.

use crate::filters::{moving_average_same, samples_for};
use log::debug;

/// Length of the box filter smoothing the integrated signal before the scan.
pub const SMOOTHING_WINDOW: usize = 25;

/// Lead-in skipped by the scan, in seconds.
pub const LEAD_IN_SEC: f64 = 0.5;

/// First index the candidate scan may report.
pub fn scan_start(fs: f64) -> usize {
    samples_for(LEAD_IN_SEC, fs).saturating_add(1)
}

/// Strict local maxima of the smoothed integrated signal.
///
/// The scan covers `scan_start(fs) ..= len - 2`, so the returned indices are
/// strictly increasing and never fall inside the lead-in.
pub fn find_candidates(integrated: &[f64], fs: f64) -> Vec<usize> {
    let smoothed = moving_average_same(integrated, SMOOTHING_WINDOW);
    let end = smoothed.len().saturating_sub(1);

    let mut candidates = Vec::new();
    for i in scan_start(fs)..end {
        if smoothed[i] > smoothed[i - 1] && smoothed[i + 1] < smoothed[i] {
            candidates.push(i);
        }
    }

    debug!(
        "candidate scan: {} local maxima in {} samples",
        candidates.len(),
        integrated.len()
    );
    candidates
}
