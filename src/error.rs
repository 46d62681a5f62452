//! Error and discrepancy types
//!
//! Fatal conditions are `OfdmError` values propagated with `?`.
//! Recoverable conditions (length reconciliation, stripped preamble, zero
//! channel estimate) are `Discrepancy` values handed back to the caller next
//! to the result.

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type for PHY operations
pub type Result<T> = std::result::Result<T, OfdmError>;

/// Errors that abort a PHY operation
#[derive(Error, Debug)]
pub enum OfdmError {
    /// Frame parameter outside its valid range (construction time)
    #[error("Invalid frame parameter {name}: {reason}")]
    InvalidFrameParameter { name: &'static str, reason: String },

    /// Unknown modulation scheme name
    #[error("Unknown constellation: {0}")]
    InvalidConstellation(String),

    /// Bit vector does not fit the modulation scheme
    #[error("Invalid bit vector for {scheme}: {reason}")]
    InvalidBitLength { scheme: String, reason: String },

    /// Runtime argument outside its valid domain
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Metric never crossed the detection threshold
    #[error("No synchronization peak above threshold {threshold}")]
    SyncNotFound { threshold: f64 },

    /// Receive operation requested before a waveform was stored
    #[error("No received waveform stored on frame")]
    NoReceivedWaveform,

    /// Payload-domain step requested before the stored waveform was demodulated
    #[error("Received waveform has not been demodulated")]
    NotDemodulated,

    /// Underlying reader/writer failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl OfdmError {
    pub(crate) fn frame_param(name: &'static str, reason: impl Into<String>) -> Self {
        OfdmError::InvalidFrameParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Check if this error was raised while validating frame construction
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            OfdmError::InvalidFrameParameter { .. } | OfdmError::InvalidConstellation(_)
        )
    }
}

/// Non-fatal condition recovered locally by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discrepancy {
    /// Waveform was truncated or zero-padded to `expected` samples
    LengthMismatch { expected: usize, actual: usize },

    /// Loaded waveform is exactly one preamble short of a full frame
    PreambleStripped { expected: usize, actual: usize },

    /// Zero channel estimate at `count` positions, equalized to 0
    DivisionSingularity { count: usize },
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discrepancy::LengthMismatch { expected, actual } => {
                write!(f, "length mismatch: expected {} samples, got {}", expected, actual)
            }
            Discrepancy::PreambleStripped { expected, actual } => write!(
                f,
                "preamble missing: expected {} samples, got {}, cyclic prefix still present",
                expected, actual
            ),
            Discrepancy::DivisionSingularity { count } => {
                write!(f, "zero channel estimate at {} positions, equalized to 0", count)
            }
        }
    }
}
