//! Loopback tests for the modulator/demodulator pair
//!
//! Exercise whole frames across geometries and schemes rather than single
//! rows: every frame must come back exactly, and the modulated length must
//! always match the frame layout.

use super::*;
use crate::constellations::Modulation;
use crate::frame::{FrameParams, OfdmFrame};

fn assert_payload_recovered(frame: &OfdmFrame, rx: &[Vec<num_complex::Complex64>]) {
    assert_eq!(rx.len(), frame.payload().len());
    for (row_rx, row_tx) in rx.iter().zip(frame.payload()) {
        assert_eq!(row_rx.len(), row_tx.len());
        for (a, b) in row_rx.iter().zip(row_tx) {
            assert!((a - b).norm() < 1e-9, "{} != {}", a, b);
        }
    }
}

// =============================================================================
// Deterministic geometries
// =============================================================================

#[test]
fn test_loopback_all_schemes_and_geometries() {
    let geometries = [(64, 16, 1, 3), (128, 0, 2, 2), (32, 8, 5, 4), (1024, 128, 1, 2)];
    for &(k, cp, m, n) in &geometries {
        for scheme in Modulation::ALL {
            let params = FrameParams {
                k,
                cp,
                m,
                n,
                payload_mod: scheme,
                seed: 9,
                ..FrameParams::default()
            };
            let frame = OfdmFrame::new(params.clone()).unwrap();
            let payload_tx = &frame.tx_waveform()[params.preamble_tlen()..];

            let demod = OfdmDemodulator::new(&params);
            let out = demod.demodulate(payload_tx, true, CpRemoval::Begin);
            assert!(out.discrepancy.is_none());
            assert_payload_recovered(&frame, &out.symbols);

            let bits: Vec<u8> = out.symbols.iter().flat_map(|row| scheme.demap(row)).collect();
            let sent: Vec<u8> = frame.payload_bits().iter().flatten().copied().collect();
            assert_eq!(bits, sent, "{} K={} CP={} M={}", scheme, k, cp, m);
        }
    }
}

#[test]
fn test_preamble_halves_repeat() {
    let params = FrameParams { k: 64, cp: 8, m: 3, n: 1, ..FrameParams::default() };
    let frame = OfdmFrame::new(params.clone()).unwrap();
    let body = &frame.tx_waveform()[params.cp_len()..params.preamble_tlen()];
    let lag = params.sync_lag();
    for i in 0..lag {
        assert!((body[i] - body[i + lag]).norm() < 1e-12);
    }
}

// =============================================================================
// Properties
// =============================================================================

mod proptest_modem {
    use super::*;
    use proptest::prelude::*;

    fn scheme() -> impl Strategy<Value = Modulation> {
        prop::sample::select(Modulation::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Property: the modulated frame is always frame_tlen samples long
        #[test]
        fn test_modulated_length_matches_layout(
            k in 1usize..96,
            cp in 0usize..24,
            m in 1usize..5,
            n in 1usize..6,
            payload in scheme(),
            seed in any::<u64>(),
        ) {
            let params = FrameParams {
                k, cp, m, n,
                payload_mod: payload,
                nt: 1,
                nf: 1,
                seed,
                ..FrameParams::default()
            };
            let frame = OfdmFrame::new(params.clone()).unwrap();
            prop_assert_eq!(frame.tx_waveform().len(), params.frame_tlen());
            prop_assert_eq!(frame.tx_waveform().len(), (n + 1) * (cp + k) * m);
        }

        /// Property: noiseless loopback recovers every payload symbol
        #[test]
        fn test_loopback_recovers_payload(
            k in 2usize..64,
            cp in 0usize..16,
            m in 1usize..4,
            n in 1usize..4,
            payload in scheme(),
            side in prop::sample::select(vec![CpRemoval::Begin, CpRemoval::End]),
        ) {
            let params = FrameParams { k, cp, m, n, payload_mod: payload, ..FrameParams::default() };
            let frame = OfdmFrame::new(params.clone()).unwrap();
            let demod = OfdmDemodulator::new(&params);
            let out = demod.demodulate(&frame.tx_waveform()[params.preamble_tlen()..], true, side);

            // Stripping at the end shifts the window by CP·M: a phase ramp
            let shift = match side {
                CpRemoval::Begin => 0.0,
                CpRemoval::End => params.cp_len() as f64,
            };
            for (row_rx, row_tx) in out.symbols.iter().zip(frame.payload()) {
                for (f, (a, b)) in row_rx.iter().zip(row_tx).enumerate() {
                    let ramp = num_complex::Complex64::from_polar(
                        1.0,
                        -2.0 * std::f64::consts::PI * f as f64 * shift / params.fft_len() as f64,
                    );
                    prop_assert!((a - b * ramp).norm() < 1e-9);
                }
            }
        }
    }
}
