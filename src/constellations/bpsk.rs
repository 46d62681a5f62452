//! BPSK constellation (1 bit per symbol)
//!
//! Bit 0 → +1 (0°)
//! Bit 1 → -1 (180°)

use num_complex::Complex64;

use crate::traits::Constellation;

/// Binary Phase Shift Keying constellation
#[derive(Debug, Clone, Copy, Default)]
pub struct Bpsk;

impl Constellation for Bpsk {
    fn bits_per_symbol(&self) -> usize {
        1
    }

    fn map_bits(&self, bits: &[u8]) -> Complex64 {
        Complex64::new(1.0 - 2.0 * bits[0] as f64, 0.0)
    }

    fn demap_into(&self, symbol: Complex64, out: &mut Vec<u8>) {
        out.push((symbol.re < 0.0) as u8);
    }
}
