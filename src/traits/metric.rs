//! TimingMetric trait - Autocorrelation timing statistics
//!
//! The preamble repeats itself every `L = ⌊K/2⌋·M` samples. Each metric
//! correlates the received stream against itself delayed by `L` and
//! normalizes by a received-energy term. The metrics differ only in the
//! energy window and the normalization, so the sweep lives here and the
//! implementations provide those two pieces.
//!
//! ## Accumulator headroom
//!
//! `P`, `R` and `RL` are updated recursively, one add and one subtract per
//! sample, and are kept in `f64`. Windows span at most `2L ≤ K·M` samples.
//! For a waveform whose samples are bounded by `A` in magnitude the
//! accumulators stay below `K·M·A²`, far inside `f64` range for any
//! realistic frame, and the relative cancellation error of the running sum
//! grows like `d·ε` with `ε = 2⁻⁵²`. A 10⁷-sample capture therefore keeps
//! roughly 9 significant digits in `R`, enough for a metric compared against
//! thresholds of order 10⁻¹. Narrowing to `f32` would leave about one digit.

use num_complex::Complex64;

/// Full output of one metric sweep
///
/// All sequences have the length of the input; element 0 is zero and
/// element `d + 1` holds the accumulator after consuming sample `d`.
#[derive(Debug, Clone, Default)]
pub struct MetricTrace {
    /// Delayed autocorrelation accumulator
    pub p: Vec<Complex64>,
    /// Energy accumulator used for normalization
    pub r: Vec<f64>,
    /// Timing metric
    pub m: Vec<f64>,
}

impl MetricTrace {
    pub fn len(&self) -> usize {
        self.m.len()
    }

    pub fn is_empty(&self) -> bool {
        self.m.is_empty()
    }
}

/// Timing metric strategy
///
/// Implementations supply the `R` recursion and the final normalization;
/// the shared `P` recursion and the sweep are provided.
pub trait TimingMetric: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Increment of the `R` accumulator for sample `d`
    ///
    /// # Arguments
    /// * `e_d` - `|y[d]|²`
    /// * `e_dl` - `|y[d−L]|²`
    /// * `e_d2l` - `|y[d−2L]|²`
    fn energy_step(&self, e_d: f64, e_dl: f64, e_d2l: f64) -> f64;

    /// Normalize the correlation into the metric value
    ///
    /// `rl` is the energy of the delayed half-window. Returns 0 when the
    /// denominator vanishes.
    fn combine(&self, p: Complex64, r: f64, rl: f64) -> f64;

    /// Run the recursive sweep over `y` with lag `lag`
    fn compute(&self, y: &[Complex64], lag: usize) -> MetricTrace {
        let len = y.len();
        let mut p = vec![Complex64::new(0.0, 0.0); len];
        let mut r = vec![0.0; len];
        let mut m = vec![0.0; len];
        let mut rl = 0.0;

        let zero = Complex64::new(0.0, 0.0);
        let at = |idx: Option<usize>| idx.map_or(zero, |i| y[i]);

        for d in 0..len.saturating_sub(1) {
            let y_d = y[d];
            let y_dl = at(d.checked_sub(lag));
            let y_d2l = at(d.checked_sub(2 * lag));

            let e_d = y_d.norm_sqr();
            let e_dl = y_dl.norm_sqr();
            let e_d2l = y_d2l.norm_sqr();

            p[d + 1] = p[d] + y_dl.conj() * y_d - y_d2l.conj() * y_dl;
            r[d + 1] = r[d] + self.energy_step(e_d, e_dl, e_d2l);
            rl += e_dl - e_d2l;
            m[d + 1] = self.combine(p[d + 1], r[d + 1], rl);
        }

        MetricTrace { p, r, m }
    }
}
