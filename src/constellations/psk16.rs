//! 16-PSK constellation (4 bits per symbol)
//!
//! The phase is built by nested half-plane offsets. With `s_i = 2·b_i − 1`:
//!
//! ```text
//! θ = s0·π/2 + s0·s1·π/4 − s0·s1·s2·π/8 + s0·s1·s2·s3·π/16 + π/16
//! ```
//!
//! Each bit selects one half of the arc left by the previous bits, so the
//! hard decision is a sequence of sign tests on the de-rotated phase.

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::traits::Constellation;

/// 16-ary Phase Shift Keying constellation
#[derive(Debug, Clone, Copy, Default)]
pub struct Psk16;

#[inline]
fn sign_of(bit: u8) -> f64 {
    2.0 * bit as f64 - 1.0
}

impl Constellation for Psk16 {
    fn bits_per_symbol(&self) -> usize {
        4
    }

    fn map_bits(&self, bits: &[u8]) -> Complex64 {
        let s0 = sign_of(bits[0]);
        let s01 = s0 * sign_of(bits[1]);
        let s012 = s01 * sign_of(bits[2]);
        let s0123 = s012 * sign_of(bits[3]);
        let theta = s0 * PI / 2.0 + s01 * PI / 4.0 - s012 * PI / 8.0 + s0123 * PI / 16.0 + PI / 16.0;
        Complex64::from_polar(1.0, theta)
    }

    fn demap_into(&self, symbol: Complex64, out: &mut Vec<u8>) {
        let mut phi = (symbol * Complex64::from_polar(1.0, -PI / 16.0)).arg();

        let b0 = (phi > 0.0) as u8;
        let s0 = sign_of(b0);
        phi -= s0 * PI / 2.0;

        let b1 = (s0 * phi > 0.0) as u8;
        let s01 = s0 * sign_of(b1);
        phi -= s01 * PI / 4.0;

        let b2 = (-s01 * phi > 0.0) as u8;
        let s012 = s01 * sign_of(b2);
        phi += s012 * PI / 8.0;

        let b3 = (s012 * phi > 0.0) as u8;

        out.extend_from_slice(&[b0, b1, b2, b3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits_of(sym: u8) -> [u8; 4] {
        [(sym >> 3) & 1, (sym >> 2) & 1, (sym >> 1) & 1, sym & 1]
    }

    #[test]
    fn test_psk16_roundtrip() {
        for sym in 0..16u8 {
            let bits = bits_of(sym);
            let mut out = Vec::new();
            Psk16.demap_into(Psk16.map_bits(&bits), &mut out);
            assert_eq!(out, bits.to_vec(), "Symbol {} roundtrip failed", sym);
        }
    }

    #[test]
    fn test_psk16_unit_magnitude() {
        for sym in 0..16u8 {
            let mag = Psk16.map_bits(&bits_of(sym)).norm();
            assert!((mag - 1.0).abs() < 1e-12, "Symbol {} magnitude: {}", sym, mag);
        }
    }

    #[test]
    fn test_psk16_points_are_distinct_multiples_of_pi_over_8() {
        let mut phases: Vec<i64> = (0..16u8)
            .map(|s| {
                let theta = Psk16.map_bits(&bits_of(s)).arg() - PI / 16.0;
                // Points sit at odd multiples of π/16 before the offset
                ((theta / (PI / 16.0)).round() as i64).rem_euclid(32)
            })
            .collect();
        phases.sort_unstable();
        phases.dedup();
        assert_eq!(phases.len(), 16);
    }

    #[test]
    fn test_psk16_decision_boundaries() {
        // ±10° stays within the ±11.25° sector of every point
        let offset = 10.0 * PI / 180.0;
        for sym in 0..16u8 {
            let bits = bits_of(sym);
            let nominal = Psk16.map_bits(&bits);
            for rot in [offset, -offset] {
                let mut out = Vec::new();
                Psk16.demap_into(nominal * Complex64::from_polar(1.0, rot), &mut out);
                assert_eq!(out, bits.to_vec(), "Symbol {} at {} rad failed", sym, rot);
            }
        }
    }
}
