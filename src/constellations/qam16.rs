//! Square 16-QAM constellation (4 bits per symbol)
//!
//! Bits (b0, b1, b2, b3): b2/b3 drive I, b0/b1 drive Q.
//! Sign bit set → positive axis, magnitude bit set → inner level.
//! Levels are ±1/√10 and ±3/√10 for unit average power.

use num_complex::Complex64;

use crate::traits::Constellation;

/// Square 16-QAM constellation
#[derive(Debug, Clone, Copy, Default)]
pub struct Qam16;

/// Decision threshold between inner and outer amplitude levels
const LEVEL_THRESHOLD: f64 = 0.632_455_532_033_675_9; // 2/√10

const SCALE: f64 = 0.316_227_766_016_837_94; // 1/√10

impl Constellation for Qam16 {
    fn bits_per_symbol(&self) -> usize {
        4
    }

    fn map_bits(&self, bits: &[u8]) -> Complex64 {
        let axis = |sign: u8, level: u8| (2.0 * sign as f64 - 1.0) * (3.0 - 2.0 * level as f64) * SCALE;
        Complex64::new(axis(bits[2], bits[3]), axis(bits[0], bits[1]))
    }

    fn demap_into(&self, symbol: Complex64, out: &mut Vec<u8>) {
        out.push((symbol.im > 0.0) as u8);
        out.push((symbol.im.abs() < LEVEL_THRESHOLD) as u8);
        out.push((symbol.re > 0.0) as u8);
        out.push((symbol.re.abs() < LEVEL_THRESHOLD) as u8);
    }
}
