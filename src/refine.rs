//! Snaps accepted band-pass locations onto the raw ECG maxima.
//!
//! The filter cascade delays the QRS energy, so the accepted locations sit a
//! few samples after the real R wave. Each one is moved to the largest raw
//! sample within 200 ms on either side.

use crate::filters::samples_for;

/// Half-width of the refinement window, seconds.
pub const REFINE_WINDOW_SEC: f64 = 0.200;

fn sorted_unique(mut indices: Vec<usize>) -> Vec<usize> {
    indices.sort_unstable();
    indices.dedup();
    indices
}

/// Deduplicates `locations`, moves each to the raw maximum in
/// `[loc - 200 ms, loc + 200 ms]` and deduplicates again.
///
/// Ties resolve to the earliest sample. The result is strictly increasing.
pub fn refine_peaks(raw: &[f64], locations: &[usize], fs: f64) -> Vec<usize> {
    let window = samples_for(REFINE_WINDOW_SEC, fs);
    let refined = sorted_unique(locations.to_vec())
        .into_iter()
        .filter_map(|loc| {
            let lo = loc.saturating_sub(window);
            let hi = loc.saturating_add(window).saturating_add(1).min(raw.len());
            (lo..hi).fold(None, |best: Option<usize>, i| match best {
                Some(b) if raw[b] >= raw[i] => Some(b),
                _ => Some(i),
            })
        })
        .collect();
    sorted_unique(refined)
}
