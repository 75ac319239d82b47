//! Benchmarks for the state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use voicekit::{
    dsp::filter::{FilterType, SVFilter},
    RenderCtx,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let ctx = RenderCtx::new(SAMPLE_RATE, 0.0);

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| ((i * 7919) % 97) as f32 / 48.0 - 1.0).collect();
        let mut buffer = input.clone();

        for (name, filter_type) in [
            ("lowpass", FilterType::LowPass),
            ("highpass", FilterType::HighPass),
            ("bandpass", FilterType::BandPass),
        ] {
            let mut filter = SVFilter::new(filter_type);
            filter.set_cutoff(2_000.0);
            filter.set_resonance(0.5);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer), black_box(&ctx));
                })
            });
        }
    }

    group.finish();
}
