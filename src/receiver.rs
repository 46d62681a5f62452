//! End-to-end receive pipeline
//!
//! ```text
//! rx ──►[Timing metric]──►[Moving sum]──►[Peak detector]──► peak
//!                                                            │
//!   sync = peak − ⌊CP/2⌋·M ◄──────────────────────────────────┘
//!     │
//!     ▼
//! rx[sync..]──►[CP removal + FFT]──►[Pilot estimate]──►[Equalize]──►[Demap]──► BER
//! ```
//!
//! The averaged metric peaks where the plateau ends, at the end of the
//! preamble. Backing off half a prefix puts every payload FFT window in the
//! middle of its cyclic prefix when the prefix is stripped at the beginning
//! of each row. The residual circular shift is a linear phase per
//! subcarrier, removed by the pilot-based equalizer.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Discrepancy, OfdmError, Result};
use crate::frame::{FrameParams, OfdmFrame};
use crate::modem::CpRemoval;
use crate::sync::{averaged_metric, find_peak, MetricKind};
use crate::traits::MetricTrace;

// ============================================================================
// Receiver Configuration
// ============================================================================

/// Configuration for the receive pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiverConfig {
    /// Timing metric used for synchronization
    pub metric: MetricKind,

    /// Detection threshold on the averaged metric
    pub threshold: f64,

    /// Moving-sum width; `None` averages over one cyclic prefix (CP·M)
    pub average_width: Option<usize>,

    /// Where the cyclic prefix is stripped from each payload row
    pub cp_removal: CpRemoval,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            metric: MetricKind::Schmidl,
            threshold: 300.0,
            average_width: None,
            cp_removal: CpRemoval::Begin,
        }
    }
}

impl ReceiverConfig {
    /// Threshold used on the hardware BER captures (CP·M = 512)
    pub fn hardware_capture() -> Self {
        Self::default()
    }

    /// Config for critically sampled frames (CP·M = 128)
    pub fn sync_experiment() -> Self {
        Self {
            threshold: 64.0,
            ..Self::default()
        }
    }

    /// Raw metric, no averaging, with a threshold on the 0..1 scale
    pub fn unaveraged(metric: MetricKind, threshold: f64) -> Self {
        Self {
            metric,
            threshold,
            average_width: Some(1),
            ..Self::default()
        }
    }

    /// Effective moving-sum width for a frame
    pub fn width_for(&self, params: &FrameParams) -> usize {
        self.average_width.unwrap_or_else(|| params.cp_len())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() {
            return Err(OfdmError::InvalidParameter(format!(
                "threshold must be finite, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Reports
// ============================================================================

/// Timing synchronization outcome
#[derive(Debug, Clone)]
pub struct SyncResult {
    /// Full metric sweep (P, R, M)
    pub trace: MetricTrace,
    /// Moving sum of the metric
    pub averaged: Vec<f64>,
    /// Detector output on the averaged metric
    pub peak_idx: usize,
    /// First sample of the first payload row, half a prefix early
    pub sync_idx: usize,
}

/// Everything produced by one pass of the receive pipeline
#[derive(Debug, Clone)]
pub struct ReceiveReport {
    pub sync: SyncResult,
    /// Channel estimate over the payload grid (N×K)
    pub channel_estimate: Vec<Vec<Complex64>>,
    /// Equalized payload (N×K)
    pub equalized: Vec<Vec<Complex64>>,
    /// Hard decisions at the data positions
    pub rx_bits: Vec<u8>,
    pub ber: f64,
    /// Non-fatal conditions recovered along the way
    pub discrepancies: Vec<Discrepancy>,
}

// ============================================================================
// Receiver
// ============================================================================

/// Synchronize, demodulate, equalize and score a received frame
#[derive(Debug, Clone, Default)]
pub struct Receiver {
    config: ReceiverConfig,
}

impl Receiver {
    pub fn new(config: ReceiverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }

    /// Locate the payload start in `samples`
    ///
    /// # Errors
    /// `SyncNotFound` if the averaged metric never exceeds the threshold.
    pub fn synchronize(&self, samples: &[Complex64], params: &FrameParams) -> Result<SyncResult> {
        let trace = self.config.metric.compute(samples, params.sync_lag());
        let width = self.config.width_for(params);
        let averaged = averaged_metric(&trace.m, width);

        let peak_idx = find_peak(&averaged, self.config.threshold).ok_or(OfdmError::SyncNotFound {
            threshold: self.config.threshold,
        })?;
        let backoff = params.cp / 2 * params.m;
        let sync_idx = peak_idx.saturating_sub(backoff);

        debug!(
            metric = %self.config.metric,
            width,
            peak_idx,
            sync_idx,
            peak_value = averaged[peak_idx],
            "frame synchronized"
        );

        Ok(SyncResult {
            trace,
            averaged,
            peak_idx,
            sync_idx,
        })
    }

    /// Run the full pipeline on the frame's received waveform
    ///
    /// The frame keeps the demodulated payload, channel estimate and
    /// equalized payload of this pass.
    pub fn run(&self, frame: &mut OfdmFrame) -> Result<ReceiveReport> {
        let rx = frame.rx_waveform().ok_or(OfdmError::NoReceivedWaveform)?;
        if !rx.cp_present {
            warn!("received waveform has no cyclic prefix, synchronizing anyway");
        }
        let sync = self.synchronize(&rx.samples, frame.params())?;

        let mut discrepancies = Vec::new();
        if let Some(d) = frame.demodulate_from(sync.sync_idx, self.config.cp_removal)? {
            discrepancies.push(d);
        }

        if let Some(d) = frame.equalize()? {
            discrepancies.push(d);
        }
        let channel_estimate = frame.channel_estimate().ok_or(OfdmError::NotDemodulated)?.to_vec();
        let equalized = frame.equalized_payload().ok_or(OfdmError::NotDemodulated)?.to_vec();
        let rx_bits = frame.rx_bits()?;
        let ber = frame.compute_ber()?;

        info!(
            sync_idx = sync.sync_idx,
            bits = rx_bits.len(),
            ber,
            "frame received"
        );

        Ok(ReceiveReport {
            sync,
            channel_estimate,
            equalized,
            rx_bits,
            ber,
            discrepancies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constellations::Modulation;

    fn ber_scenario() -> FrameParams {
        FrameParams {
            k: 1024,
            cp: 128,
            m: 1,
            n: 4,
            preamble_mod: Modulation::Bpsk,
            payload_mod: Modulation::Qpsk,
            nt: 2,
            nf: 1,
            seed: 42,
        }
    }

    #[test]
    fn test_noiseless_frame_zero_ber() {
        let mut frame = OfdmFrame::new(ber_scenario()).unwrap();
        frame.add_noise(f64::INFINITY).unwrap();

        let receiver = Receiver::new(ReceiverConfig::sync_experiment()).unwrap();
        let report = receiver.run(&mut frame).unwrap();

        // Averaged plateau ends with the preamble
        let preamble_end = frame.params().preamble_tlen();
        assert!(
            report.sync.peak_idx + 1 >= preamble_end && report.sync.peak_idx <= preamble_end,
            "peak at {}",
            report.sync.peak_idx
        );
        assert_eq!(report.sync.sync_idx, report.sync.peak_idx - 64);
        assert_eq!(report.ber, 0.0);
        assert_eq!(report.rx_bits.len(), frame.total_bits());
        assert_eq!(report.channel_estimate.len(), 4);
        assert_eq!(report.equalized.len(), 4);
        // Slicing half a prefix early leaves extra samples at the tail
        assert!(matches!(
            report.discrepancies.as_slice(),
            [Discrepancy::LengthMismatch { .. }]
        ));
    }

    #[test]
    fn test_delayed_noisy_frame() {
        let params = FrameParams { k: 256, cp: 32, m: 2, n: 6, ..ber_scenario() };
        let mut frame = OfdmFrame::new(params).unwrap();
        frame.add_noise(25.0).unwrap();

        // Capture starts with 300 samples of silence
        let mut capture = vec![Complex64::new(0.0, 0.0); 300];
        capture.extend_from_slice(&frame.rx_waveform().unwrap().samples);
        frame.set_rx(capture, true);

        let config = ReceiverConfig { threshold: 32.0, ..ReceiverConfig::default() };
        let report = Receiver::new(config).unwrap().run(&mut frame).unwrap();

        let payload_start = 300 + frame.params().preamble_tlen();
        let offset = payload_start as i64 - report.sync.sync_idx as i64;
        assert!(offset > 0 && (offset as usize) < frame.params().cp_len(), "offset {}", offset);
        assert_eq!(report.ber, 0.0);
    }

    #[test]
    fn test_every_metric_synchronizes() {
        let mut frame = OfdmFrame::new(ber_scenario()).unwrap();
        frame.add_noise(f64::INFINITY).unwrap();

        // Minn peaks at 1, Wilson at 0.5 on the plateau
        for (metric, threshold) in [(MetricKind::Schmidl, 64.0), (MetricKind::Minn, 64.0), (MetricKind::Wilson, 32.0)] {
            let config = ReceiverConfig { metric, threshold, ..ReceiverConfig::default() };
            let report = Receiver::new(config).unwrap().run(&mut frame).unwrap();
            assert_eq!(report.ber, 0.0, "{} failed", metric);
        }
    }

    #[test]
    fn test_silent_payload_reported() {
        let mut frame = OfdmFrame::new(ber_scenario()).unwrap();
        frame.add_noise(f64::INFINITY).unwrap();

        // Preamble intact, payload and tail silent
        let preamble_end = frame.params().preamble_tlen();
        let mut capture = frame.rx_waveform().unwrap().samples.clone();
        for s in capture[preamble_end..].iter_mut() {
            *s = Complex64::new(0.0, 0.0);
        }
        frame.set_rx(capture, true);

        let report = Receiver::new(ReceiverConfig::sync_experiment()).unwrap().run(&mut frame).unwrap();
        // The last pilot row lies entirely in the silent part
        let k = frame.params().k;
        assert!(
            report
                .discrepancies
                .iter()
                .any(|d| matches!(d, Discrepancy::DivisionSingularity { count } if *count >= k)),
            "{:?}",
            report.discrepancies
        );
    }

    #[test]
    fn test_sync_not_found() {
        let mut frame = OfdmFrame::new(ber_scenario()).unwrap();
        frame.set_rx(vec![Complex64::new(0.0, 0.0); 4096], true);
        let err = Receiver::new(ReceiverConfig::sync_experiment())
            .unwrap()
            .run(&mut frame)
            .unwrap_err();
        assert!(matches!(err, OfdmError::SyncNotFound { .. }));
    }

    #[test]
    fn test_requires_received_waveform() {
        let mut frame = OfdmFrame::new(ber_scenario()).unwrap();
        let err = Receiver::default().run(&mut frame).unwrap_err();
        assert!(matches!(err, OfdmError::NoReceivedWaveform));
    }

    #[test]
    fn test_config_validation() {
        assert!(Receiver::new(ReceiverConfig { threshold: f64::NAN, ..ReceiverConfig::default() }).is_err());
        let params = ber_scenario();
        assert_eq!(ReceiverConfig::default().width_for(&params), 128);
        assert_eq!(ReceiverConfig::unaveraged(MetricKind::Minn, 0.8).width_for(&params), 1);
    }
}
