//! Synthetic ECG-like signals for integration tests.
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Five-sample QRS spike centred on its third sample.
pub const QRS_SHAPE: [f64; 5] = [0.5, 2.0, 5.0, 2.0, 0.5];

/// Adds `QRS_SHAPE * scale` centred on each index in `at`.
pub fn add_spikes(signal: &mut [f64], at: &[usize], scale: f64) {
    for &center in at {
        for (k, v) in QRS_SHAPE.iter().enumerate() {
            let i = center + k;
            if i >= 2 && i - 2 < signal.len() {
                signal[i - 2] += v * scale;
            }
        }
    }
}

/// Gaussian bump of `amplitude` and standard deviation `width` samples,
/// truncated to +-40 samples.
pub fn add_bump(signal: &mut [f64], center: usize, amplitude: f64, width: f64) {
    for k in -40i64..=40 {
        let i = center as i64 + k;
        if i >= 0 && (i as usize) < signal.len() {
            let d = k as f64 / width;
            signal[i as usize] += amplitude * (-0.5 * d * d).exp();
        }
    }
}

pub fn add_noise(signal: &mut [f64], sigma: f64, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, sigma).unwrap();
    for v in signal.iter_mut() {
        *v += noise.sample(&mut rng);
    }
}

/// Regular beats every `period` samples starting at `first`, leaving room
/// for the spike tail at the end.
pub fn beat_positions(len: usize, first: usize, period: usize) -> Vec<usize> {
    (first..len.saturating_sub(2)).step_by(period).collect()
}

pub fn median(values: &mut [usize]) -> usize {
    values.sort_unstable();
    values[values.len() / 2]
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
