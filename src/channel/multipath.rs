//! Sparse tap-delay-line channel
//!
//! Each path is a real gain applied at an integer sample delay. The output
//! keeps the full convolution tail, so it is `max(delay)` samples longer
//! than the input.

use num_complex::Complex64;

use crate::error::{OfdmError, Result};

/// Tap-delay-line multipath channel
#[derive(Debug, Clone, PartialEq)]
pub struct MultipathChannel {
    gains: Vec<f64>,
    delays: Vec<usize>,
}

impl MultipathChannel {
    /// Create a channel from matching gain and delay lists
    ///
    /// The first gain is the direct path and is always applied at delay 0,
    /// whatever `delays[0]` holds.
    ///
    /// # Errors
    /// `InvalidParameter` if the lists differ in length or are empty.
    pub fn new(gains: &[f64], delays: &[usize]) -> Result<Self> {
        if gains.is_empty() {
            return Err(OfdmError::InvalidParameter(
                "multipath channel needs at least one gain".into(),
            ));
        }
        if gains.len() != delays.len() {
            return Err(OfdmError::InvalidParameter(format!(
                "{} gains for {} delays",
                gains.len(),
                delays.len()
            )));
        }

        let mut delays = delays.to_vec();
        delays[0] = 0;
        Ok(Self {
            gains: gains.to_vec(),
            delays,
        })
    }

    /// Largest path delay in samples
    pub fn max_delay(&self) -> usize {
        self.delays.iter().copied().max().unwrap_or(0)
    }

    pub fn num_paths(&self) -> usize {
        self.gains.len()
    }

    /// Frequency response at normalized frequency `f / fft_len`
    pub fn frequency_response(&self, bin: usize, fft_len: usize) -> Complex64 {
        self.gains
            .iter()
            .zip(&self.delays)
            .map(|(&g, &d)| {
                let phase = -2.0 * std::f64::consts::PI * (bin * d) as f64 / fft_len as f64;
                Complex64::from_polar(g, phase)
            })
            .sum()
    }

    /// Convolve `input` with the tap-delay line
    pub fn apply(&self, input: &[Complex64]) -> Vec<Complex64> {
        let mut out = vec![Complex64::new(0.0, 0.0); input.len() + self.max_delay()];
        for (&gain, &delay) in self.gains.iter().zip(&self.delays) {
            for (o, &x) in out[delay..].iter_mut().zip(input) {
                *o += x * gain;
            }
        }
        out
    }
}
