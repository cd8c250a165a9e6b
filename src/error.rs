//! Error types shared by the detector, the record loaders and the CLI.

use std::io;
use thiserror::Error;

/// Result type for QRS detection and record handling.
pub type Result<T> = std::result::Result<T, QrsError>;

/// Errors produced while validating input, detecting peaks or loading records.
#[derive(Error, Debug)]
pub enum QrsError {
    /// Empty signal, non-finite sample or non-positive sampling rate
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Too few R-peaks to derive an RR interval
    #[error("insufficient data: need at least {needed} peaks, found {found}")]
    InsufficientData { needed: usize, found: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed record line (1-based line number)
    #[error("parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("EDF error: {0}")]
    Edf(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
