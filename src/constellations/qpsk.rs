//! QPSK constellation (2 bits per symbol)
//!
//! Independent I/Q split, first bit on I, second bit on Q:
//! 00 → 45°, 10 → 135°, 11 → 225°, 01 → 315° (all scaled by 1/√2)

use num_complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;

use crate::traits::Constellation;

/// Quadrature Phase Shift Keying constellation
#[derive(Debug, Clone, Copy, Default)]
pub struct Qpsk;

impl Constellation for Qpsk {
    fn bits_per_symbol(&self) -> usize {
        2
    }

    fn map_bits(&self, bits: &[u8]) -> Complex64 {
        let i = (1.0 - 2.0 * bits[0] as f64) * FRAC_1_SQRT_2;
        let q = (1.0 - 2.0 * bits[1] as f64) * FRAC_1_SQRT_2;
        Complex64::new(i, q)
    }

    fn demap_into(&self, symbol: Complex64, out: &mut Vec<u8>) {
        out.push((symbol.re < 0.0) as u8);
        out.push((symbol.im < 0.0) as u8);
    }
}
