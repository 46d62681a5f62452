//! Pilot-based channel estimation and zero-forcing equalization
//!
//! 1. Least-squares estimate `H = rx / tx` on every pilot position
//! 2. Bilinear interpolation of real and imaginary parts separately over
//!    the pilot lattice, for every position of the N×K grid
//! 3. Element-wise division of the received symbols by the estimate
//!
//! The pilot lattice always includes both ends of both axes, so no grid
//! position falls outside the interpolation span.

mod interpolate;

pub use interpolate::GridInterpolator;

use num_complex::Complex64;
use tracing::{debug, warn};

use crate::error::Discrepancy;
use crate::frame::PilotGrid;

/// Equalized payload with the division singularities, if any
#[derive(Debug, Clone)]
pub struct Equalized {
    /// N rows of K equalized symbols
    pub symbols: Vec<Vec<Complex64>>,
    /// Set when some positions had a zero channel estimate
    pub discrepancy: Option<Discrepancy>,
}

/// Complex division returning 0 for a zero denominator
#[inline]
fn safe_div(num: Complex64, den: Complex64) -> Complex64 {
    if den.norm_sqr() > 0.0 {
        num / den
    } else {
        Complex64::new(0.0, 0.0)
    }
}

/// Estimate the channel over the whole payload grid
///
/// # Arguments
/// * `tx` - Transmitted payload symbols (N×K)
/// * `rx` - Received payload symbols (N×K)
/// * `grid` - Pilot positions
pub fn estimate_channel(
    tx: &[Vec<Complex64>],
    rx: &[Vec<Complex64>],
    grid: &PilotGrid,
) -> Vec<Vec<Complex64>> {
    let (n, k) = grid.shape();
    let times = grid.time_indices();
    let freqs = grid.freq_indices();

    let mut h_re = Vec::with_capacity(grid.len());
    let mut h_im = Vec::with_capacity(grid.len());
    let mut silent_pilots = 0;
    for &t in times {
        for &f in freqs {
            if tx[t][f].norm_sqr() == 0.0 {
                silent_pilots += 1;
            }
            let h = safe_div(rx[t][f], tx[t][f]);
            h_re.push(h.re);
            h_im.push(h.im);
        }
    }

    if silent_pilots > 0 {
        warn!(silent_pilots, "zero transmitted pilot, estimate set to 0 there");
    }

    let re = GridInterpolator::new(times, freqs, &h_re);
    let im = GridInterpolator::new(times, freqs, &h_im);

    debug!(pilots = grid.len(), n, k, "interpolating channel estimate");
    (0..n)
        .map(|t| (0..k).map(|f| Complex64::new(re.eval(t, f), im.eval(t, f))).collect())
        .collect()
}

/// Zero-forcing equalization, `rx / H` with 0 where `H` vanishes
///
/// Positions with a vanishing estimate are counted and reported as a
/// `DivisionSingularity`.
pub fn equalize(rx: &[Vec<Complex64>], h: &[Vec<Complex64>]) -> Equalized {
    let singular = h.iter().flatten().filter(|hh| hh.norm_sqr() == 0.0).count();
    let symbols = rx
        .iter()
        .zip(h)
        .map(|(row, h_row)| row.iter().zip(h_row).map(|(&y, &hh)| safe_div(y, hh)).collect())
        .collect();

    let discrepancy = if singular > 0 {
        let d = Discrepancy::DivisionSingularity { count: singular };
        warn!("{}", d);
        Some(d)
    } else {
        None
    };

    Equalized { symbols, discrepancy }
}
