//! Schmidl-Cox, Minn and Wilson timing metrics
//!
//! All three share the delayed autocorrelation
//! `P[d+1] = P[d] + y*[d−L]·y[d] − y*[d−2L]·y[d−L]` and differ in the
//! energy normalization:
//!
//! | Metric  | R update                    | M                 |
//! |---------|-----------------------------|-------------------|
//! | Schmidl | `+|y[d]|² − |y[d−L]|²`      | `|P|² / R²`       |
//! | Minn    | `+|y[d]|² − |y[d−2L]|²`     | `|P|² / (R/2)²`   |
//! | Wilson  | Minn, plus `RL` half-window | `|P|² / (R·RL)`   |

use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{OfdmError, Result};
use crate::traits::{MetricTrace, TimingMetric};
use crate::utils::moving_sum;

// ============================================================================
// Metric implementations
// ============================================================================

/// Schmidl-Cox metric, energy over the most recent half-window
#[derive(Debug, Clone, Copy, Default)]
pub struct Schmidl;

impl TimingMetric for Schmidl {
    fn name(&self) -> &'static str {
        "schmidl"
    }

    #[inline]
    fn energy_step(&self, e_d: f64, e_dl: f64, _e_d2l: f64) -> f64 {
        e_d - e_dl
    }

    #[inline]
    fn combine(&self, p: Complex64, r: f64, _rl: f64) -> f64 {
        let den = r * r;
        if den > 0.0 {
            p.norm_sqr() / den
        } else {
            0.0
        }
    }
}

/// Minn metric, energy over the full two half-windows
#[derive(Debug, Clone, Copy, Default)]
pub struct Minn;

impl TimingMetric for Minn {
    fn name(&self) -> &'static str {
        "minn"
    }

    #[inline]
    fn energy_step(&self, e_d: f64, _e_dl: f64, e_d2l: f64) -> f64 {
        e_d - e_d2l
    }

    #[inline]
    fn combine(&self, p: Complex64, r: f64, _rl: f64) -> f64 {
        let half = r / 2.0;
        let den = half * half;
        if den > 0.0 {
            p.norm_sqr() / den
        } else {
            0.0
        }
    }
}

/// Wilson metric, geometric normalization by both half-window energies
#[derive(Debug, Clone, Copy, Default)]
pub struct Wilson;

impl TimingMetric for Wilson {
    fn name(&self) -> &'static str {
        "wilson"
    }

    #[inline]
    fn energy_step(&self, e_d: f64, _e_dl: f64, e_d2l: f64) -> f64 {
        e_d - e_d2l
    }

    #[inline]
    fn combine(&self, p: Complex64, r: f64, rl: f64) -> f64 {
        // Only an exactly silent window is undefined; a slightly negative
        // product left by running-sum cancellation passes through
        if r == 0.0 || rl == 0.0 {
            0.0
        } else {
            p.norm_sqr() / (r * rl)
        }
    }
}

// ============================================================================
// Runtime selector
// ============================================================================

/// Timing metric selected at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    #[default]
    Schmidl,
    Minn,
    Wilson,
}

impl MetricKind {
    pub const ALL: [MetricKind; 3] = [MetricKind::Schmidl, MetricKind::Minn, MetricKind::Wilson];

    pub fn metric(&self) -> &'static dyn TimingMetric {
        match self {
            Self::Schmidl => &Schmidl,
            Self::Minn => &Minn,
            Self::Wilson => &Wilson,
        }
    }

    /// Full sweep over `y` with lag `lag`
    pub fn compute(&self, y: &[Complex64], lag: usize) -> MetricTrace {
        self.metric().compute(y, lag)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.metric().name())
    }
}

impl FromStr for MetricKind {
    type Err = OfdmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "schmidl" | "schmidl-cox" => Ok(Self::Schmidl),
            "minn" => Ok(Self::Minn),
            "wilson" => Ok(Self::Wilson),
            other => Err(OfdmError::InvalidParameter(format!(
                "unknown timing metric '{}'",
                other
            ))),
        }
    }
}

/// Metric smoothed by a moving sum over `width` samples
///
/// The Schmidl plateau spans the whole cyclic prefix; summing over the
/// prefix length turns it into a peak at the plateau end.
pub fn averaged_metric(metric: &[f64], width: usize) -> Vec<f64> {
    moving_sum(metric, width)
}
