//! OFDM Modulator
//!
//! Frequency-domain rows of K subcarriers → oversampled time-domain samples.
//!
//! Per row:
//! 1. Zero-pad from K to K·M bins (zeros after bin K−1)
//! 2. Inverse DFT of size K·M, scaled by 1/√(K·M) (unitary)
//! 3. Prepend the last CP·M samples of the periodic extension as cyclic prefix
//!
//! Zero-padding before the inverse transform is ideal (sinc) interpolation,
//! which realizes the oversampling factor M.

use std::sync::Arc;

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

use crate::error::{OfdmError, Result};
use crate::frame::FrameParams;

/// IFFT + cyclic prefix modulator for one frame geometry
pub struct OfdmModulator {
    k: usize,
    fft_len: usize,
    cp_len: usize,
    ifft: Arc<dyn Fft<f64>>,
    scale: f64,
}

impl OfdmModulator {
    /// Create a modulator with its own FFT planner
    pub fn new(params: &FrameParams) -> Self {
        let mut planner = FftPlanner::new();
        Self::with_planner(params, &mut planner)
    }

    /// Create a modulator reusing plans cached in `planner`
    pub fn with_planner(params: &FrameParams, planner: &mut FftPlanner<f64>) -> Self {
        let fft_len = params.fft_len();
        Self {
            k: params.k,
            fft_len,
            cp_len: params.cp_len(),
            ifft: planner.plan_fft_inverse(fft_len),
            scale: 1.0 / (fft_len as f64).sqrt(),
        }
    }

    /// Output samples per row, cyclic prefix included
    pub fn symbol_len(&self) -> usize {
        self.cp_len + self.fft_len
    }

    /// Modulate one row of K subcarriers and append it to `out`
    ///
    /// # Errors
    /// `InvalidParameter` if the row does not hold exactly K symbols.
    pub fn modulate_symbol(&self, row: &[Complex64], out: &mut Vec<Complex64>) -> Result<()> {
        if row.len() != self.k {
            return Err(OfdmError::InvalidParameter(format!(
                "OFDM symbol has {} subcarriers, expected {}",
                row.len(),
                self.k
            )));
        }

        let mut buffer = vec![Complex64::new(0.0, 0.0); self.fft_len];
        buffer[..self.k].copy_from_slice(row);
        self.ifft.process(&mut buffer);
        for s in buffer.iter_mut() {
            *s *= self.scale;
        }

        // Prefix is the cyclic extension of the body, so CP·M may exceed K·M
        let start = self.fft_len - self.cp_len % self.fft_len;
        out.reserve(self.symbol_len());
        out.extend((0..self.cp_len).map(|i| buffer[(start + i) % self.fft_len]));
        out.extend_from_slice(&buffer);
        Ok(())
    }

    /// Modulate rows in order and flatten them into one waveform
    pub fn modulate(&self, rows: &[Vec<Complex64>]) -> Result<Vec<Complex64>> {
        let mut out = Vec::with_capacity(rows.len() * self.symbol_len());
        for row in rows {
            self.modulate_symbol(row, &mut out)?;
        }
        Ok(out)
    }

    /// Modulate a complete frame: preamble row then payload rows
    pub fn modulate_frame(
        &self,
        preamble: &[Complex64],
        payload: &[Vec<Complex64>],
    ) -> Result<Vec<Complex64>> {
        let mut out = Vec::with_capacity((payload.len() + 1) * self.symbol_len());
        self.modulate_symbol(preamble, &mut out)?;
        for row in payload {
            self.modulate_symbol(row, &mut out)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(k: usize, cp: usize, m: usize) -> FrameParams {
        FrameParams { k, cp, m, n: 1, ..FrameParams::default() }
    }

    #[test]
    fn test_cyclic_prefix_copies_tail() {
        let p = params(16, 4, 2);
        let modulator = OfdmModulator::new(&p);
        let row: Vec<Complex64> = (0..16).map(|i| Complex64::new(i as f64, -(i as f64))).collect();

        let mut out = Vec::new();
        modulator.modulate_symbol(&row, &mut out).unwrap();
        assert_eq!(out.len(), 40);

        let cp = p.cp_len();
        for i in 0..cp {
            assert_eq!(out[i], out[out.len() - cp + i], "CP sample {} differs", i);
        }
    }

    #[test]
    fn test_prefix_longer_than_symbol() {
        // CP·M = 10 > K·M = 4: the prefix wraps around the body twice and a half
        let p = FrameParams { k: 4, cp: 5, m: 1, n: 1, ..FrameParams::default() };
        p.validate().unwrap();
        let modulator = OfdmModulator::new(&p);
        let row: Vec<Complex64> = (0..4).map(|i| Complex64::new(1.0 + i as f64, 0.5)).collect();

        let mut out = Vec::new();
        modulator.modulate_symbol(&row, &mut out).unwrap();
        assert_eq!(out.len(), 9);
        let body = &out[5..];
        for (i, s) in out[..5].iter().enumerate() {
            // Sample j of the row equals body[(j − CP) mod K·M]
            assert_eq!(*s, body[(i + 4 - 1) % 4], "prefix sample {}", i);
        }

        let frame = crate::frame::OfdmFrame::new(FrameParams { k: 4, cp: 8, m: 1, n: 1, ..FrameParams::default() }).unwrap();
        assert_eq!(frame.tx_waveform().len(), 2 * 12);
    }

    #[test]
    fn test_no_cyclic_prefix() {
        let modulator = OfdmModulator::new(&params(8, 0, 3));
        let row = vec![Complex64::new(1.0, 0.0); 8];
        let mut out = Vec::new();
        modulator.modulate_symbol(&row, &mut out).unwrap();
        assert_eq!(out.len(), 24);
    }

    #[test]
    fn test_single_dc_bin_is_flat() {
        // Only bin 0 active → constant time samples of 1/√(K·M)
        let p = params(4, 0, 2);
        let modulator = OfdmModulator::new(&p);
        let mut row = vec![Complex64::new(0.0, 0.0); 4];
        row[0] = Complex64::new(1.0, 0.0);

        let out = modulator.modulate(&[row]).unwrap();
        let expected = 1.0 / (8.0_f64).sqrt();
        for s in out {
            assert!((s.re - expected).abs() < 1e-12);
            assert!(s.im.abs() < 1e-12);
        }
    }

    #[test]
    fn test_energy_preserved() {
        let p = params(32, 8, 4);
        let modulator = OfdmModulator::new(&p);
        let row: Vec<Complex64> = (0..32).map(|i| Complex64::from_polar(1.0, i as f64 * 0.3)).collect();
        let mut out = Vec::new();
        modulator.modulate_symbol(&row, &mut out).unwrap();

        let body_energy: f64 = out[p.cp_len()..].iter().map(|s| s.norm_sqr()).sum();
        assert!((body_energy - 32.0).abs() < 1e-9, "Energy {}", body_energy);
    }

    #[test]
    fn test_rejects_wrong_row_length() {
        let modulator = OfdmModulator::new(&params(8, 2, 1));
        let err = modulator.modulate(&[vec![Complex64::new(0.0, 0.0); 7]]).unwrap_err();
        assert!(matches!(err, OfdmError::InvalidParameter(_)));
    }
}
