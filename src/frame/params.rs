//! Frame parameters
//!
//! Plain configuration struct with validated construction, derived lengths
//! and named presets for the setups used against the hardware receiver.

use serde::{Deserialize, Serialize};

use crate::constellations::Modulation;
use crate::error::{OfdmError, Result};

/// OFDM frame parameters
///
/// Frame layout: one preamble symbol followed by `n` payload symbols, each
/// `(cp + k)·m` samples long at the oversampled rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameParams {
    /// Number of subcarriers (K)
    pub k: usize,

    /// Cyclic prefix length in samples at the Nyquist rate (CP)
    pub cp: usize,

    /// Oversampling factor (M)
    pub m: usize,

    /// Number of payload OFDM symbols (N)
    pub n: usize,

    /// Preamble subcarrier modulation
    pub preamble_mod: Modulation,

    /// Payload subcarrier modulation (data and pilots)
    pub payload_mod: Modulation,

    /// Pilot spacing in time, in OFDM symbols (Nt)
    pub nt: usize,

    /// Pilot spacing in frequency, in subcarriers (Nf)
    pub nf: usize,

    /// Seed of the frame random generator
    pub seed: u64,
}

impl Default for FrameParams {
    fn default() -> Self {
        Self {
            k: 1024,
            cp: 128,
            m: 5,
            n: 10,
            preamble_mod: Modulation::Bpsk,
            payload_mod: Modulation::Qpsk,
            nt: 1,
            nf: 1,
            seed: 0,
        }
    }
}

impl FrameParams {
    /// Frame captured by the hardware BER campaign (M=4, 256 symbols)
    pub fn hardware_capture() -> Self {
        Self {
            k: 1024,
            cp: 128,
            m: 4,
            n: 256,
            preamble_mod: Modulation::Bpsk,
            payload_mod: Modulation::Qpsk,
            nt: 4,
            nf: 1,
            seed: 42,
        }
    }

    /// Short frame for synchronization experiments
    ///
    /// Pilots on the first and last subcarrier only, so the payload carries
    /// almost no channel-estimation overhead.
    pub fn sync_experiment() -> Self {
        Self {
            k: 1024,
            cp: 128,
            m: 1,
            n: 2,
            preamble_mod: Modulation::Bpsk,
            payload_mod: Modulation::Qpsk,
            nt: 2,
            nf: 1024,
            seed: 42,
        }
    }

    /// Check every field against its valid range
    ///
    /// # Errors
    /// `InvalidFrameParameter` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.k < 1 {
            return Err(OfdmError::frame_param("K", "must be at least 1"));
        }
        if self.m < 1 {
            return Err(OfdmError::frame_param("M", "must be at least 1"));
        }
        if self.n < 1 {
            return Err(OfdmError::frame_param("N", "must be at least 1"));
        }
        if self.nt < 1 || self.nt > self.n {
            return Err(OfdmError::frame_param(
                "Nt",
                format!("{} outside 1..={}", self.nt, self.n),
            ));
        }
        if self.nf < 1 || self.nf > self.k {
            return Err(OfdmError::frame_param(
                "Nf",
                format!("{} outside 1..={}", self.nf, self.k),
            ));
        }
        Ok(())
    }

    /// Samples per OFDM symbol including the cyclic prefix
    pub fn symbol_tlen(&self) -> usize {
        (self.cp + self.k) * self.m
    }

    /// FFT size at the oversampled rate (K·M)
    pub fn fft_len(&self) -> usize {
        self.k * self.m
    }

    /// Cyclic prefix length at the oversampled rate (CP·M)
    pub fn cp_len(&self) -> usize {
        self.cp * self.m
    }

    pub fn preamble_tlen(&self) -> usize {
        self.symbol_tlen()
    }

    pub fn payload_tlen(&self) -> usize {
        self.n * self.symbol_tlen()
    }

    pub fn frame_tlen(&self) -> usize {
        self.preamble_tlen() + self.payload_tlen()
    }

    /// Autocorrelation lag of the timing metrics, half a preamble symbol
    pub fn sync_lag(&self) -> usize {
        self.k / 2 * self.m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(FrameParams::default().validate().is_ok());
        assert!(FrameParams::hardware_capture().validate().is_ok());
        assert!(FrameParams::sync_experiment().validate().is_ok());
    }

    #[test]
    fn test_derived_lengths() {
        let p = FrameParams { k: 64, cp: 16, m: 2, n: 3, ..FrameParams::default() };
        assert_eq!(p.preamble_tlen(), 160);
        assert_eq!(p.payload_tlen(), 480);
        assert_eq!(p.frame_tlen(), 640);
        assert_eq!(p.fft_len(), 128);
        assert_eq!(p.cp_len(), 32);
        assert_eq!(p.sync_lag(), 64);
    }

    #[test]
    fn test_odd_k_lag_rounds_down() {
        let p = FrameParams { k: 9, cp: 0, m: 3, n: 1, ..FrameParams::default() };
        assert_eq!(p.sync_lag(), 12);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let base = FrameParams { k: 16, cp: 4, m: 1, n: 4, ..FrameParams::default() };
        let cases = [
            FrameParams { k: 0, ..base.clone() },
            FrameParams { m: 0, ..base.clone() },
            FrameParams { n: 0, ..base.clone() },
            FrameParams { nt: 0, ..base.clone() },
            FrameParams { nt: 5, ..base.clone() },
            FrameParams { nf: 0, ..base.clone() },
            FrameParams { nf: 17, ..base.clone() },
        ];
        for params in cases {
            let err = params.validate().unwrap_err();
            assert!(
                matches!(err, OfdmError::InvalidFrameParameter { .. }),
                "{:?} accepted",
                params
            );
        }
    }

    #[test]
    fn test_boundary_spacings_accepted() {
        let p = FrameParams { k: 16, cp: 0, m: 1, n: 4, nt: 4, nf: 16, ..FrameParams::default() };
        assert!(p.validate().is_ok());
    }
}
