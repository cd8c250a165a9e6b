//! Pan-Tompkins filter cascade.
//!
//! The raw ECG passes through four stages, each producing a buffer of the
//! same length as the input:
//!
//! 1. band-pass (cascaded integer low-pass and high-pass, roughly 5-15 Hz),
//!    normalised by its peak magnitude over the whole buffer
//! 2. five-point derivative
//! 3. squaring
//! 4. moving-window integration over 150 ms
//!
//! All stages operate on the complete buffer. The band-pass normalisation
//! needs the global maximum, so the cascade is not usable sample by sample.

use log::debug;

/// Integration window length in seconds.
pub const INTEGRATION_WINDOW_SEC: f64 = 0.150;

/// Number of samples covering `seconds` at `fs`, rounded half to even.
pub(crate) fn samples_for(seconds: f64, fs: f64) -> usize {
    (seconds * fs).round_ties_even().max(0.0) as usize
}

/// Output of every stage of the cascade.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterStages {
    pub bandpass: Vec<f64>,
    pub derivative: Vec<f64>,
    pub squared: Vec<f64>,
    pub integrated: Vec<f64>,
}

impl FilterStages {
    /// Runs the full cascade over `signal` sampled at `fs` Hz.
    pub fn compute(signal: &[f64], fs: f64) -> Self {
        let bandpass = bandpass(signal);
        let derivative = derivative(&bandpass, fs);
        let squared = squaring(&derivative);
        let integrated = moving_window_integration(&squared, fs);
        debug!(
            "filter cascade: {} samples, integration window {} samples",
            signal.len(),
            samples_for(INTEGRATION_WINDOW_SEC, fs).max(1)
        );
        Self {
            bandpass,
            derivative,
            squared,
            integrated,
        }
    }

    pub fn len(&self) -> usize {
        self.bandpass.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bandpass.is_empty()
    }
}

/// Band-pass filter built from two causal difference equations.
///
/// Low-pass: `y[n] = 2y[n-1] - y[n-2] + x[n] - 2x[n-6] + x[n-12]`
///
/// High-pass: `y[n] = 32lp[n-16] - y[n-1] - lp[n] + lp[n-32]`
///
/// Terms with negative indices are zero. The result is divided by its
/// largest magnitude unless that magnitude is zero.
pub fn bandpass(signal: &[f64]) -> Vec<f64> {
    let n = signal.len();

    let mut low = vec![0.0; n];
    for i in 0..n {
        let mut y = signal[i];
        if i >= 1 {
            y += 2.0 * low[i - 1];
        }
        if i >= 2 {
            y -= low[i - 2];
        }
        if i >= 6 {
            y -= 2.0 * signal[i - 6];
        }
        if i >= 12 {
            y += signal[i - 12];
        }
        low[i] = y;
    }

    let mut high = vec![0.0; n];
    for i in 0..n {
        let mut y = -low[i];
        if i >= 1 {
            y -= high[i - 1];
        }
        if i >= 16 {
            y += 32.0 * low[i - 16];
        }
        if i >= 32 {
            y += low[i - 32];
        }
        high[i] = y;
    }

    let peak = high.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if peak > 0.0 {
        for v in &mut high {
            *v /= peak;
        }
    } else {
        debug!("band-pass output is identically zero, skipping normalisation");
    }
    high
}

/// Five-point derivative `(-x[n-2] - 2x[n-1] + 2x[n+1] + x[n+2]) * fs / 8`.
///
/// The first two and last two samples are left at zero.
pub fn derivative(signal: &[f64], fs: f64) -> Vec<f64> {
    let n = signal.len();
    let mut out = vec![0.0; n];
    let scale = fs / 8.0;
    for i in 2..n.saturating_sub(2) {
        out[i] = (-signal[i - 2] - 2.0 * signal[i - 1] + 2.0 * signal[i + 1] + signal[i + 2])
            * scale;
    }
    out
}

pub fn squaring(signal: &[f64]) -> Vec<f64> {
    signal.iter().map(|v| v * v).collect()
}

/// Moving average over `round(0.150 * fs)` samples with "same" alignment.
pub fn moving_window_integration(signal: &[f64], fs: f64) -> Vec<f64> {
    let window = samples_for(INTEGRATION_WINDOW_SEC, fs).max(1);
    moving_average_same(signal, window)
}

/// Convolution of `signal` with a box kernel of `window` taps of weight
/// `1 / window`, cropped to the input length and centred the way a "same"
/// convolution is: output `i` is full-convolution sample `i + (window - 1) / 2`.
///
/// Near the edges only the overlapping samples contribute, the divisor stays
/// `window`.
pub fn moving_average_same(signal: &[f64], window: usize) -> Vec<f64> {
    let n = signal.len();
    let mut out = vec![0.0; n];
    if window == 0 || n == 0 {
        return out;
    }
    let offset = (window - 1) / 2;
    let scale = window as f64;
    for (i, slot) in out.iter_mut().enumerate() {
        let full = i + offset;
        let lo = (full + 1).saturating_sub(window);
        let hi = full.min(n - 1);
        if lo > hi {
            continue;
        }
        let sum: f64 = signal[lo..=hi].iter().sum();
        *slot = sum / scale;
    }
    out
}
