//! Bit error rate scoring over the data positions of a payload grid

use num_complex::Complex64;

use crate::constellations::Modulation;
use crate::frame::PilotGrid;

/// Symbols at the data (non-pilot) positions, row-major
pub fn data_symbols(symbols: &[Vec<Complex64>], grid: &PilotGrid) -> Vec<Complex64> {
    grid.data_positions().map(|(t, f)| symbols[t][f]).collect()
}

/// Hard-decision bits carried by the data positions
pub fn data_bits(symbols: &[Vec<Complex64>], grid: &PilotGrid, scheme: Modulation) -> Vec<u8> {
    scheme.demap(&data_symbols(symbols, grid))
}

/// Fraction of differing bits between two payloads
///
/// Both grids are demapped at the data positions only. A grid without data
/// positions scores 0.
pub fn compute_ber(
    tx: &[Vec<Complex64>],
    rx: &[Vec<Complex64>],
    grid: &PilotGrid,
    scheme: Modulation,
) -> f64 {
    let total = grid.data_len() * scheme.bits_per_symbol();
    if total == 0 {
        return 0.0;
    }

    let tx_bits = data_bits(tx, grid, scheme);
    let rx_bits = data_bits(rx, grid, scheme);
    let errors = tx_bits.iter().zip(&rx_bits).filter(|(a, b)| a != b).count();
    errors as f64 / total as f64
}
