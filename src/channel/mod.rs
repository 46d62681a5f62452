//! Channel simulation
//!
//! AWGN scaled from a per-bit SNR and a sparse multipath tap-delay line.
//! Noise generators are seeded from the caller's `ChaCha8Rng`, so a frame's
//! generator fully determines every noise realization.

mod multipath;
mod noise;

pub use multipath::MultipathChannel;
pub use noise::NoiseGenerator;

use num_complex::Complex64;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::utils::db_to_power_ratio;

/// Noise power per complex sample for a target Eb/N0
///
/// `Es/N0 = 10^(snr_db/10) · bits_per_symbol` and the noise power is
/// `signal_power / (Es/N0)`. Returns 0 for `snr_db = +∞`.
pub fn noise_power_for_snr(signal_power: f64, snr_db: f64, bits_per_symbol: usize) -> f64 {
    if snr_db == f64::INFINITY {
        return 0.0;
    }
    let es_n0 = db_to_power_ratio(snr_db) * bits_per_symbol as f64;
    signal_power / es_n0
}

/// Add circularly-symmetric Gaussian noise of `noise_power` to `signal`
///
/// A zero noise power returns the input unchanged and leaves `rng`
/// untouched.
pub fn add_awgn(signal: &[Complex64], noise_power: f64, rng: &mut ChaCha8Rng) -> Vec<Complex64> {
    if noise_power <= 0.0 {
        return signal.to_vec();
    }

    debug!(noise_power, samples = signal.len(), "adding AWGN");
    let mut out = signal.to_vec();
    NoiseGenerator::new(noise_power, rng).corrupt(&mut out);
    out
}
