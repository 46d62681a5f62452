//! Fixed-point conversion for sc16 sample files

/// Full-scale magnitude of a normalized sample
pub const SC16_FULL_SCALE: f64 = i16::MAX as f64;

/// Quantize a normalized value (nominally within ±1) to a saturated i16
///
/// NaN maps to 0.
#[inline]
pub fn quantize_sc16(normalized: f64) -> i16 {
    // `as` saturates at the i16 bounds and maps NaN to 0
    (normalized * SC16_FULL_SCALE).round() as i16
}
