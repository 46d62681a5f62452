//! OFDM Demodulator
//!
//! Received time-domain payload → N×K frequency-domain symbols.
//!
//! 1. Reconcile the input length (truncate or zero-pad, recorded)
//! 2. Cut into N rows, with or without cyclic prefix
//! 3. Strip CP·M samples at the beginning or end of each row
//! 4. Forward DFT of size K·M, scaled by 1/√(K·M), keep bins 0..K
//!
//! Step 4 discards the interpolation bins added by the modulator.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Discrepancy, OfdmError, Result};
use crate::frame::FrameParams;

/// Which end of each received row holds the samples to discard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CpRemoval {
    /// Drop the first CP·M samples (the prefix itself when aligned)
    Begin,
    /// Drop the last CP·M samples (window starts one prefix early)
    #[default]
    End,
}

impl fmt::Display for CpRemoval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpRemoval::Begin => f.write_str("begin"),
            CpRemoval::End => f.write_str("end"),
        }
    }
}

impl FromStr for CpRemoval {
    type Err = OfdmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "begin" | "beginning" => Ok(CpRemoval::Begin),
            "end" => Ok(CpRemoval::End),
            other => Err(OfdmError::InvalidParameter(format!(
                "unknown cyclic prefix removal side '{}'",
                other
            ))),
        }
    }
}

/// Demodulated payload with the length discrepancy, if any
#[derive(Debug, Clone)]
pub struct Demodulated {
    /// N rows of K subcarriers
    pub symbols: Vec<Vec<Complex64>>,
    /// Set when the input had to be truncated or zero-padded
    pub discrepancy: Option<Discrepancy>,
}

/// CP removal + FFT demodulator for one frame geometry
pub struct OfdmDemodulator {
    k: usize,
    n: usize,
    fft_len: usize,
    cp_len: usize,
    fft: Arc<dyn Fft<f64>>,
    scale: f64,
}

impl OfdmDemodulator {
    /// Create a demodulator with its own FFT planner
    pub fn new(params: &FrameParams) -> Self {
        let mut planner = FftPlanner::new();
        Self::with_planner(params, &mut planner)
    }

    /// Create a demodulator reusing plans cached in `planner`
    pub fn with_planner(params: &FrameParams, planner: &mut FftPlanner<f64>) -> Self {
        let fft_len = params.fft_len();
        Self {
            k: params.k,
            n: params.n,
            fft_len,
            cp_len: params.cp_len(),
            fft: planner.plan_fft_forward(fft_len),
            scale: 1.0 / (fft_len as f64).sqrt(),
        }
    }

    /// Samples per received row
    pub fn row_len(&self, cp_present: bool) -> usize {
        if cp_present {
            self.cp_len + self.fft_len
        } else {
            self.fft_len
        }
    }

    /// Samples expected for the whole payload
    pub fn expected_len(&self, cp_present: bool) -> usize {
        self.n * self.row_len(cp_present)
    }

    /// Demodulate a received payload
    ///
    /// # Arguments
    /// * `rx` - Time-domain payload samples, starting at the first row
    /// * `cp_present` - Rows still carry their cyclic prefix
    /// * `side` - Where to strip the prefix when present
    pub fn demodulate(&self, rx: &[Complex64], cp_present: bool, side: CpRemoval) -> Demodulated {
        let row_len = self.row_len(cp_present);
        let expected = self.n * row_len;

        let discrepancy = if rx.len() != expected {
            let d = Discrepancy::LengthMismatch {
                expected,
                actual: rx.len(),
            };
            if rx.len() > expected {
                warn!("{}: removing excess samples", d);
            } else {
                warn!("{}: adding zero padding", d);
            }
            Some(d)
        } else {
            None
        };

        let zero = Complex64::new(0.0, 0.0);
        let skip = match (cp_present, side) {
            (true, CpRemoval::Begin) => self.cp_len,
            _ => 0,
        };

        let mut symbols = Vec::with_capacity(self.n);
        let mut buffer = vec![zero; self.fft_len];
        for row in 0..self.n {
            let start = row * row_len + skip;
            for (j, slot) in buffer.iter_mut().enumerate() {
                *slot = rx.get(start + j).copied().unwrap_or(zero);
            }
            self.fft.process(&mut buffer);
            symbols.push(buffer[..self.k].iter().map(|&s| s * self.scale).collect());
        }

        Demodulated { symbols, discrepancy }
    }
}
