//! Circularly-symmetric complex Gaussian noise
//!
//! One Box-Muller draw yields two independent unit Gaussians, used directly
//! as the I and Q parts of one complex sample. Each axis is scaled by
//! `sqrt(P/2)` so that `E|n|² = P`.

use num_complex::Complex64;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::TAU;

/// Complex AWGN source of fixed power
pub struct NoiseGenerator {
    /// Per-axis standard deviation
    sigma: f64,
    rng: ChaCha8Rng,
}

impl NoiseGenerator {
    /// Create a source of total power `noise_power` per complex sample
    ///
    /// The internal stream is seeded by one draw from `seed_rng`, so the
    /// caller's generator advances by exactly one value.
    pub fn new(noise_power: f64, seed_rng: &mut ChaCha8Rng) -> Self {
        Self {
            sigma: (noise_power / 2.0).sqrt(),
            rng: ChaCha8Rng::seed_from_u64(seed_rng.gen()),
        }
    }

    /// Total noise power per complex sample
    pub fn power(&self) -> f64 {
        2.0 * self.sigma * self.sigma
    }

    /// Draw one complex noise sample
    pub fn next_complex(&mut self) -> Complex64 {
        // Open interval keeps ln() finite
        let u1: f64 = self.rng.gen::<f64>().max(f64::MIN_POSITIVE);
        let u2: f64 = self.rng.gen();
        Complex64::from_polar(self.sigma * (-2.0 * u1.ln()).sqrt(), TAU * u2)
    }

    /// Add noise in place to every sample of `block`
    pub fn corrupt(&mut self, block: &mut [Complex64]) {
        for s in block.iter_mut() {
            *s += self.next_complex();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(power: f64, n: usize, seed: u64) -> Vec<Complex64> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut noise = NoiseGenerator::new(power, &mut rng);
        (0..n).map(|_| noise.next_complex()).collect()
    }

    #[test]
    fn test_power_bookkeeping() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let noise = NoiseGenerator::new(0.2, &mut rng);
        assert!((noise.power() - 0.2).abs() < 1e-15);
        assert!((noise.sigma - 0.1_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_measured_power_split_evenly() {
        for &power in &[0.01, 1.0, 25.0] {
            let samples = draw(power, 50_000, 7);
            let n = samples.len() as f64;
            let total = samples.iter().map(|s| s.norm_sqr()).sum::<f64>() / n;
            let re = samples.iter().map(|s| s.re * s.re).sum::<f64>() / n;
            assert!((total - power).abs() / power < 0.03, "power {} measured {}", power, total);
            assert!((re / total - 0.5).abs() < 0.02, "I share {}", re / total);
        }
    }

    #[test]
    fn test_zero_mean_uncorrelated_axes() {
        let samples = draw(1.0, 100_000, 11);
        let n = samples.len() as f64;
        let mean: Complex64 = samples.iter().sum::<Complex64>() / n;
        let cross = samples.iter().map(|s| s.re * s.im).sum::<f64>() / n;
        assert!(mean.norm() < 0.01, "mean {}", mean);
        assert!(cross.abs() < 0.01, "I/Q correlation {}", cross);
    }

    #[test]
    fn test_gaussian_envelope() {
        // |n|² of circular Gaussian noise is exponential: P(|n|² > P) = e⁻¹
        let samples = draw(2.0, 100_000, 3);
        let above = samples.iter().filter(|s| s.norm_sqr() > 2.0).count() as f64 / samples.len() as f64;
        assert!((above - (-1.0_f64).exp()).abs() < 0.01, "tail fraction {}", above);
        assert!(samples.iter().all(|s| s.re.is_finite() && s.im.is_finite()));
    }

    #[test]
    fn test_seeding_consumes_one_draw() {
        let mut a = ChaCha8Rng::seed_from_u64(5);
        let mut b = ChaCha8Rng::seed_from_u64(5);
        let mut noise_a = NoiseGenerator::new(0.5, &mut a);
        let _: u64 = b.gen();
        assert_eq!(a.gen::<u64>(), b.gen::<u64>());

        // Corrupting silence exposes the raw noise stream
        let mut block = vec![Complex64::new(0.0, 0.0); 8];
        let mut noise_b = NoiseGenerator::new(0.5, &mut ChaCha8Rng::seed_from_u64(5));
        noise_b.corrupt(&mut block);
        for s in &block {
            assert_eq!(*s, noise_a.next_complex());
        }

        // Offset block: same stream, up to rounding of the addition
        let mut offset = vec![Complex64::new(1.0, -2.0); 8];
        let mut noise_c = NoiseGenerator::new(0.5, &mut ChaCha8Rng::seed_from_u64(5));
        noise_c.corrupt(&mut offset);
        for (s, n) in offset.iter().zip(&block) {
            assert!((s - Complex64::new(1.0, -2.0) - n).norm() < 1e-12);
        }
    }
}
