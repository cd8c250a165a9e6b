//! # qrsweaver
//!
//! QRS (heartbeat) detection for ECG recordings using the Pan-Tompkins
//! method.
//!
//! - [`filters`]: band-pass, derivative, squaring and moving-window
//!   integration over the whole buffer
//! - [`candidates`]: local maxima of the smoothed integrated signal
//! - [`detector`]: adaptive dual thresholds with search-back and T-wave
//!   rejection, folded over the candidates in time order
//! - [`refine`]: snapping accepted peaks onto the raw R waves
//! - [`heart_rate`]: BPM from the final peak set
//!
//! ## Example
//!
//! ```no_run
//! use qrsweaver::{QrsDetector, Signal};
//!
//! # fn main() -> qrsweaver::Result<()> {
//! let samples = vec![0.0; 3600];
//! let signal = Signal::new(samples, 360.0)?;
//! let detection = QrsDetector::new().detect(&signal);
//! println!("R-peaks: {:?}", detection.r_peaks);
//! if let Ok(hr) = detection.heart_rate() {
//!     println!("Heart rate: {:.1} BPM", hr.mean_bpm);
//! }
//! # Ok(())
//! # }
//! ```

pub mod candidates;
pub mod csv_utils;
pub mod detector;
pub mod edf_utils;
pub mod error;
pub mod filters;
pub mod heart_rate;
pub mod pipeline;
pub mod refine;
pub mod signal;

pub use detector::{CandidateTrace, Decision, DetectorOutcome, DetectorState};
pub use error::{QrsError, Result};
pub use filters::FilterStages;
pub use heart_rate::{HeartRate, HeartRateConfig};
pub use pipeline::{detect_r_peaks, DetectionSummary, QrsDetection, QrsDetector};
pub use signal::Signal;
