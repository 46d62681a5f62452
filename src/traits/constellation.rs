//! Constellation trait - Bit group ↔ subcarrier symbol mapping
//!
//! Defines how a group of bits maps to one complex subcarrier value.
//! This trait knows nothing about framing, pilots or subcarrier layout.

use num_complex::Complex64;

/// Symbol alphabet mapping trait
///
/// Implementations define the geometry of the constellation diagram.
/// Used by the frame builder (bits → symbol) and by the BER scorer and
/// receiver (symbol → bits).
pub trait Constellation: Send + Sync {
    /// Bits carried by one symbol
    fn bits_per_symbol(&self) -> usize;

    /// Number of points in the constellation
    fn order(&self) -> usize {
        1 << self.bits_per_symbol()
    }

    /// Map one bit group to a complex symbol
    ///
    /// # Arguments
    /// * `bits` - Exactly `bits_per_symbol()` values, each 0 or 1
    fn map_bits(&self, bits: &[u8]) -> Complex64;

    /// Hard decision on a received symbol
    ///
    /// Appends `bits_per_symbol()` bits for the nearest constellation point.
    fn demap_into(&self, symbol: Complex64, out: &mut Vec<u8>);
}
