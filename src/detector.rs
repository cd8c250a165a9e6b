//! Adaptive dual-threshold QRS decision logic.
//!
//! Candidates are visited in increasing index order and folded into a single
//! [`DetectorState`]. Each step
//!
//! - looks up the probable R location on the band-passed channel,
//! - refreshes the RR statistics from the candidate history,
//! - classifies the candidate as signal, noise or T-wave, running search-back
//!   when the current interval suggests a missed beat,
//! - refreshes both threshold pairs.
//!
//! The state is created per run and consumed by [`DetectorState::finish`];
//! nothing outside the fold can observe or mutate it mid-run.

use crate::filters::samples_for;
use log::{debug, trace};
use serde::Serialize;
use std::ops::Range;

/// Slow EMA weight for signal/noise level updates.
pub const SLOW_WEIGHT: f64 = 0.125;
/// Fast EMA weight used by search-back.
pub const FAST_WEIGHT: f64 = 0.25;
/// Primary threshold position between the noise and signal levels.
pub const THRESHOLD_FRACTION: f64 = 0.25;

/// Half-width of the probable-peak window, seconds.
pub const PEAK_WINDOW_SEC: f64 = 0.150;

/// Number of RR intervals kept for the running averages.
pub const RR_HISTORY: usize = 8;
pub const RR_LOW_RATIO: f64 = 0.92;
pub const RR_HIGH_RATIO: f64 = 1.16;
pub const RR_MISSED_RATIO: f64 = 1.66;

/// Intervals in this open range (seconds) are checked for T-waves.
pub const T_WAVE_RR_SEC: (f64, f64) = (0.20, 0.36);
pub const T_WAVE_SLOPE_RATIO: f64 = 0.5;

fn slow(sample: f64, level: f64) -> f64 {
    SLOW_WEIGHT * sample + (1.0 - SLOW_WEIGHT) * level
}

fn fast(sample: f64, level: f64) -> f64 {
    FAST_WEIGHT * sample + (1.0 - FAST_WEIGHT) * level
}

/// Index of the first maximum of `values[range]`, `None` for an empty range.
fn argmax(values: &[f64], range: Range<usize>) -> Option<usize> {
    range.fold(None, |best: Option<usize>, i| match best {
        Some(b) if values[b] >= values[i] => Some(b),
        _ => Some(i),
    })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Outcome of a single candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// First candidate, probable peak accepted
    LearningSignal,
    /// First candidate, probable peak below the band-pass threshold
    LearningNoise,
    Signal,
    /// Integrated level below `threshold_i1`
    Noise,
    /// Integrated level passed but the band-passed peak did not
    BandpassNoise,
    TWave,
}

/// Detector levels recorded after a candidate's threshold refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateTrace {
    pub index: usize,
    pub probable_peak: Option<usize>,
    pub decision: Decision,
    pub spki: f64,
    pub npki: f64,
    pub spkf: f64,
    pub npkf: f64,
    pub threshold_i1: f64,
    pub threshold_f1: f64,
}

/// Read-only view of the channels one run works on.
#[derive(Debug, Clone, Copy)]
pub struct Channels<'a> {
    integrated: &'a [f64],
    bandpass: &'a [f64],
    candidates: &'a [usize],
    fs: f64,
    peak_window: usize,
}

impl<'a> Channels<'a> {
    /// `integrated` and `bandpass` must have equal lengths and every
    /// candidate must index into them.
    pub fn new(
        integrated: &'a [f64],
        bandpass: &'a [f64],
        candidates: &'a [usize],
        fs: f64,
    ) -> Self {
        debug_assert_eq!(integrated.len(), bandpass.len());
        debug_assert!(candidates.iter().all(|&c| c < integrated.len()));
        Self {
            integrated,
            bandpass,
            candidates,
            fs,
            peak_window: samples_for(PEAK_WINDOW_SEC, fs),
        }
    }

    /// Band-pass maximum in `[peak - 150 ms, peak + 150 ms)`.
    pub fn probable_peak(&self, peak: usize) -> Option<usize> {
        let lo = peak.saturating_sub(self.peak_window);
        let hi = peak.saturating_add(self.peak_window).min(self.bandpass.len());
        argmax(self.bandpass, lo..hi)
    }

    /// Steepest rise of the integrated signal over the half-window ending at `at`.
    fn max_slope(&self, at: usize) -> f64 {
        let lo = at.saturating_sub(self.peak_window / 2);
        self.integrated[lo..=at]
            .windows(2)
            .map(|w| w[1] - w[0])
            .reduce(f64::max)
            .unwrap_or(0.0)
    }
}

/// Mutable record of one detection run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectorState {
    pub spki: f64,
    pub npki: f64,
    pub spkf: f64,
    pub npkf: f64,
    pub threshold_i1: f64,
    pub threshold_i2: f64,
    pub threshold_f1: f64,
    pub threshold_f2: f64,
    pub rr_low_limit: f64,
    pub rr_high_limit: f64,
    pub rr_missed_limit: f64,
    pub rr_average1: f64,
    rr_valid: Vec<f64>,
    t_wave: bool,
    r_locations: Vec<usize>,
    search_back: Vec<usize>,
    trace: Vec<CandidateTrace>,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectorOutcome {
    /// Accepted band-pass locations in acceptance order, duplicates possible.
    pub r_locations: Vec<usize>,
    /// Locations recovered by search-back (also present in `r_locations`).
    pub search_back: Vec<usize>,
    pub trace: Vec<CandidateTrace>,
}

impl DetectorOutcome {
    pub fn count(&self, decision: Decision) -> usize {
        self.trace.iter().filter(|t| t.decision == decision).count()
    }
}

/// Runs the detector over `candidates`, which must be strictly increasing.
pub fn detect(
    integrated: &[f64],
    bandpass: &[f64],
    candidates: &[usize],
    fs: f64,
) -> DetectorOutcome {
    debug_assert!(candidates.windows(2).all(|w| w[0] < w[1]));
    let channels = Channels::new(integrated, bandpass, candidates, fs);
    let outcome = candidates
        .iter()
        .enumerate()
        .fold(DetectorState::default(), |state, (ind, &peak)| {
            state.step(&channels, ind, peak)
        })
        .finish();

    debug!(
        "detector: {} candidates, {} accepted, {} search-back, {} T-waves",
        candidates.len(),
        outcome.r_locations.len(),
        outcome.search_back.len(),
        outcome.count(Decision::TWave)
    );
    outcome
}

impl DetectorState {
    /// Processes candidate number `ind` located at sample `peak`.
    pub fn step(mut self, ch: &Channels<'_>, ind: usize, peak: usize) -> Self {
        let probable = ch.probable_peak(peak);
        if ind > 0 {
            self.update_rr(ch, ind);
        }
        let decision = self.classify(ch, ind, peak, probable);
        self.refresh_thresholds();

        trace!(
            "candidate {ind} @ {peak}: {decision:?} (I1 {:.4}, F1 {:.4})",
            self.threshold_i1,
            self.threshold_f1
        );
        self.trace.push(CandidateTrace {
            index: peak,
            probable_peak: probable,
            decision,
            spki: self.spki,
            npki: self.npki,
            spkf: self.spkf,
            npkf: self.npkf,
            threshold_i1: self.threshold_i1,
            threshold_f1: self.threshold_f1,
        });
        self
    }

    pub fn finish(self) -> DetectorOutcome {
        DetectorOutcome {
            r_locations: self.r_locations,
            search_back: self.search_back,
            trace: self.trace,
        }
    }

    fn update_rr(&mut self, ch: &Channels<'_>, ind: usize) {
        let recent = &ch.candidates[ind.saturating_sub(RR_HISTORY)..=ind];
        let rr1: Vec<f64> = recent
            .windows(2)
            .map(|w| (w[1] - w[0]) as f64 / ch.fs)
            .collect();
        self.rr_average1 = mean(&rr1);

        let mut rr_average2 = self.rr_average1;
        if ind >= RR_HISTORY {
            let (low, high) = (self.rr_low_limit, self.rr_high_limit);
            let mut valid: Vec<f64> = rr1
                .into_iter()
                .filter(|rr| (low..=high).contains(rr))
                .collect();
            if valid.len() > RR_HISTORY {
                valid.drain(..valid.len() - RR_HISTORY);
            }
            if !valid.is_empty() {
                rr_average2 = mean(&valid);
            }
            self.rr_valid = valid;
        }

        if self.rr_valid.len() >= RR_HISTORY || ind < RR_HISTORY {
            self.rr_low_limit = RR_LOW_RATIO * rr_average2;
            self.rr_high_limit = RR_HIGH_RATIO * rr_average2;
            self.rr_missed_limit = RR_MISSED_RATIO * rr_average2;
        }
    }

    fn classify(
        &mut self,
        ch: &Channels<'_>,
        ind: usize,
        peak: usize,
        probable: Option<usize>,
    ) -> Decision {
        let level = ch.integrated[peak];

        if level < self.threshold_i1 {
            self.npki = slow(level, self.npki);
            if let Some(p) = probable {
                self.npkf = slow(ch.bandpass[p], self.npkf);
            }
            return Decision::Noise;
        }

        if ind == 0 {
            self.spki = slow(level, self.spki);
            return if self.accept_probable(ch, probable) {
                Decision::LearningSignal
            } else {
                Decision::LearningNoise
            };
        }

        let rr_n = (peak - ch.candidates[ind - 1]) as f64 / ch.fs;
        if self.rr_average1 < self.rr_low_limit || self.rr_average1 > self.rr_missed_limit {
            self.threshold_i1 /= 2.0;
            self.threshold_f1 /= 2.0;
        }
        self.search_back(ch, peak, rr_n);

        if self.is_t_wave(ch, ind, peak, rr_n) {
            self.t_wave = true;
            self.npki = slow(level, self.npki);
            debug!("T-wave rejected at {peak} (RR {rr_n:.3}s)");
            return Decision::TWave;
        }

        if self.accept_probable(ch, probable) {
            self.spki = slow(level, self.spki);
            Decision::Signal
        } else {
            Decision::BandpassNoise
        }
    }

    /// Accepts the probable peak when it clears `threshold_f1`, otherwise
    /// feeds it to the band-pass noise level.
    fn accept_probable(&mut self, ch: &Channels<'_>, probable: Option<usize>) -> bool {
        let Some(p) = probable else {
            return false;
        };
        let value = ch.bandpass[p];
        if value > self.threshold_f1 {
            self.spkf = slow(value, self.spkf);
            self.r_locations.push(p);
            true
        } else {
            self.npkf = slow(value, self.npkf);
            false
        }
    }

    /// Re-scans the last interval for a beat the thresholds let through.
    fn search_back(&mut self, ch: &Channels<'_>, peak: usize, rr_n: f64) {
        if rr_n <= self.rr_missed_limit {
            return;
        }
        let span = (rr_n * ch.fs).round_ties_even() as usize;
        let start = (peak + 1).saturating_sub(span);
        let threshold = self.threshold_i1;
        let best = (start..=peak)
            .filter(|&i| ch.integrated[i] > threshold)
            .fold(None, |best: Option<usize>, i| match best {
                Some(b) if ch.integrated[b] >= ch.integrated[i] => Some(b),
                _ => Some(i),
            });
        let Some(x) = best else {
            return;
        };
        self.spki = fast(ch.integrated[x], self.spki);

        let lo = x.saturating_sub(ch.peak_window);
        let hi = x.min(ch.bandpass.len());
        let Some(loc) = argmax(ch.bandpass, lo..hi) else {
            return;
        };
        let value = ch.bandpass[loc];
        if value > self.threshold_f1 && value > self.threshold_f2 {
            self.spkf = fast(value, self.spkf);
            self.r_locations.push(loc);
            self.search_back.push(loc);
            debug!("search-back recovered {loc} (RR {rr_n:.3}s)");
        }
    }

    fn is_t_wave(&self, ch: &Channels<'_>, ind: usize, peak: usize, rr_n: f64) -> bool {
        let (min_rr, max_rr) = T_WAVE_RR_SEC;
        if rr_n <= min_rr || rr_n >= max_rr {
            return false;
        }
        let previous = ch.candidates[ind - 1];
        ch.max_slope(peak) < T_WAVE_SLOPE_RATIO * ch.max_slope(previous)
    }

    fn refresh_thresholds(&mut self) {
        self.threshold_i1 = self.npki + THRESHOLD_FRACTION * (self.spki - self.npki);
        self.threshold_f1 = self.npkf + THRESHOLD_FRACTION * (self.spkf - self.npkf);
        self.threshold_i2 = 0.5 * self.threshold_i1;
        self.threshold_f2 = 0.5 * self.threshold_f1;
        self.t_wave = false;
    }

    pub fn r_locations(&self) -> &[usize] {
        &self.r_locations
    }

    pub fn in_t_wave(&self) -> bool {
        self.t_wave
    }
}
