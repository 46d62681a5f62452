//! Threshold peak detector
//!
//! Two-state machine over a metric sequence. While searching it waits for
//! the first sample above the threshold; while detecting it tracks the
//! running maximum and reports it as soon as the metric falls back below
//! the threshold. Only the first excursion is ever reported, matching a
//! counter-based hardware detector that latches on the first peak.

use tracing::debug;

/// Detector state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetectorState {
    /// No sample above threshold seen yet
    Searching,
    /// Inside an excursion, tracking its maximum
    Detecting { max_idx: usize, max_value: f64 },
}

/// Streaming threshold peak detector
#[derive(Debug, Clone)]
pub struct PeakDetector {
    threshold: f64,
    state: DetectorState,
    index: usize,
    peak: Option<usize>,
}

impl PeakDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            state: DetectorState::Searching,
            index: 0,
            peak: None,
        }
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    /// Feed one metric sample
    ///
    /// Returns `Some(index)` once the first excursion has ended; every later
    /// call keeps returning that index.
    pub fn push(&mut self, value: f64) -> Option<usize> {
        if self.peak.is_some() {
            return self.peak;
        }

        let i = self.index;
        self.index += 1;

        match self.state {
            DetectorState::Searching => {
                if value > self.threshold {
                    self.state = DetectorState::Detecting { max_idx: i, max_value: value };
                }
            }
            DetectorState::Detecting { max_idx, max_value } => {
                if value < self.threshold {
                    self.peak = Some(max_idx);
                } else if value > max_value {
                    self.state = DetectorState::Detecting { max_idx: i, max_value: value };
                }
            }
        }
        self.peak
    }

    /// Close the stream: an excursion still open at the end is reported
    pub fn finish(&self) -> Option<usize> {
        match (self.peak, self.state) {
            (Some(idx), _) => Some(idx),
            (None, DetectorState::Detecting { max_idx, .. }) => Some(max_idx),
            (None, DetectorState::Searching) => None,
        }
    }
}

/// Index of the first threshold excursion's maximum, `None` without crossing
pub fn find_peak(metric: &[f64], threshold: f64) -> Option<usize> {
    let mut detector = PeakDetector::new(threshold);
    for &value in metric {
        if let Some(idx) = detector.push(value) {
            debug!(peak = idx, threshold, "synchronization peak found");
            return Some(idx);
        }
    }
    let peak = detector.finish();
    debug!(?peak, threshold, "metric ended while detecting");
    peak
}
