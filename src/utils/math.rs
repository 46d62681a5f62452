//! Small DSP math helpers

use num_complex::Complex64;

/// Convert a power ratio in dB to linear scale
#[inline]
pub fn db_to_power_ratio(db: f64) -> f64 {
    10.0_f64.powf(db / 10.0)
}

/// Mean of `|x|²` over a sample block (0 for an empty block)
pub fn mean_power(samples: &[Complex64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| s.norm_sqr()).sum::<f64>() / samples.len() as f64
}

/// Recursive moving sum over a window of `width` samples
///
/// For `i < width` the output is the running sum of `x[0..=i]`; afterwards
/// each step adds `x[i]` and drops `x[i − width]`, so the cost is O(1) per
/// sample regardless of the window. `width == 0` yields all zeros.
pub fn moving_sum(x: &[f64], width: usize) -> Vec<f64> {
    let mut out = vec![0.0; x.len()];
    if width == 0 {
        return out;
    }

    let mut acc = 0.0;
    for (i, &v) in x.iter().enumerate() {
        acc += v;
        if i >= width {
            acc -= x[i - width];
        }
        out[i] = acc;
    }
    out
}
