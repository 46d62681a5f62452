//! Timing synchronization
//!
//! Timing metric sweep, moving-sum smoothing and first-excursion peak
//! detection.

mod detector;
mod metrics;

pub use detector::{find_peak, DetectorState, PeakDetector};
pub use metrics::{averaged_metric, MetricKind, Minn, Schmidl, Wilson};
