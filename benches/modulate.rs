//! Modulation benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use radcom_phy::*;

fn benchmark_frame_build(c: &mut Criterion) {
    let params = FrameParams::default();

    c.bench_function("ofdm_frame_build_k1024_m5_n10", |b| {
        b.iter(|| black_box(OfdmFrame::new(params.clone()).unwrap()))
    });
}

fn benchmark_qam16_modulate(c: &mut Criterion) {
    let params = FrameParams {
        payload_mod: Modulation::Qam16,
        ..FrameParams::default()
    };
    let frame = OfdmFrame::new(params).unwrap();
    let modulator = frame.modulator();

    c.bench_function("qam16_modulate_10_symbols", |b| {
        b.iter(|| black_box(modulator.modulate(frame.payload()).unwrap()))
    });
}

criterion_group!(benches, benchmark_frame_build, benchmark_qam16_modulate);
criterion_main!(benches);
