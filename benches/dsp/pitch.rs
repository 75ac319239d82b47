//! Benchmarks for root-frequency estimation.
//!
//! Runs at load time, not on the audio thread, but large recordings should
//! still load without a visible stall.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use voicekit::dsp::pitch::{FftRootEstimator, RootEstimator};

pub fn bench_pitch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/pitch");
    let estimator = FftRootEstimator::new();

    for &len in &[1024usize, 4096, 16384] {
        let data: Vec<f32> = (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 44_100.0).sin())
            .collect();

        group.bench_with_input(BenchmarkId::new("estimate", len), &len, |b, _| {
            b.iter(|| estimator.estimate(black_box(&data), black_box(44_100)))
        });
    }

    group.finish();
}
