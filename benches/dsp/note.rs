//! Benchmarks for wavetable note playback.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use voicekit::{
    dsp::{envelope::EnvelopeParams, note::Note, waveform},
    RenderCtx,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_note(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/note");
    let ctx = RenderCtx::new(SAMPLE_RATE, 0.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Sustained sine, no bend
        let mut note = Note::new(440.0, Some(waveform::sine()))
            .with_envelope(EnvelopeParams::adsr(0.001, 0.0, 1.0, 0.1));
        note.press();
        group.bench_with_input(BenchmarkId::new("sine", size), &size, |b, _| {
            b.iter(|| {
                buffer.fill(0.0);
                note.render_add(black_box(&mut buffer), black_box(&ctx), 0.0);
            })
        });

        // A long recorded loop, the sample-voice case
        let recording: Vec<f32> = (0..4096).map(|i| (i as f32 * 0.05).sin()).collect();
        let mut note = Note::new(261.63, Some(recording.into()))
            .with_envelope(EnvelopeParams::adsr(0.0, 0.0, 1.0, 0.05));
        note.set_loop(0.1, 0.9);
        note.press();
        group.bench_with_input(BenchmarkId::new("recording", size), &size, |b, _| {
            b.iter(|| {
                buffer.fill(0.0);
                note.render_add(black_box(&mut buffer), black_box(&ctx), 0.0);
            })
        });
    }

    group.finish();
}
