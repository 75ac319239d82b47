//! Benchmarks for single voices.
//!
//! Each voice is pressed once and rendered repeatedly. Drum envelopes decay
//! to silence eventually, so the numbers lean towards the idle path on long
//! runs; the sustained sample voice does not.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use voicekit::{
    voice::{
        drum::{kick, snare},
        hat::open_hat,
        SampleVoice, Voice,
    },
    RenderCtx,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn pressed<V: Voice>(mut voice: V, note: u8, ctx: &RenderCtx) -> V {
    voice.press(note, 1.0, ctx);
    voice
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    let ctx = RenderCtx::new(SAMPLE_RATE, 0.0);

    let recording: Vec<f32> = (0..4096).map(|i| (i as f32 * 0.0627).sin()).collect();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Two swept partials through a lowpass
        let mut voice = pressed(kick(), 36, &ctx);
        group.bench_with_input(BenchmarkId::new("kick", size), &size, |b, _| {
            b.iter(|| voice.render_block(black_box(&mut buffer), black_box(&ctx)))
        });

        // Noise plus tone through a highpass
        let mut voice = pressed(snare(), 38, &ctx);
        group.bench_with_input(BenchmarkId::new("snare", size), &size, |b, _| {
            b.iter(|| voice.render_block(black_box(&mut buffer), black_box(&ctx)))
        });

        let mut voice = pressed(open_hat(), 46, &ctx);
        group.bench_with_input(BenchmarkId::new("open_hat", size), &size, |b, _| {
            b.iter(|| voice.render_block(black_box(&mut buffer), black_box(&ctx)))
        });

        // Pitch-corrected looping recording
        let mut sample = SampleVoice::new(SAMPLE_RATE as u32);
        sample.load(recording.clone(), 44_100, Some(440.0));
        let mut voice = pressed(sample, 60, &ctx);
        group.bench_with_input(BenchmarkId::new("sample", size), &size, |b, _| {
            b.iter(|| voice.render_block(black_box(&mut buffer), black_box(&ctx)))
        });
    }

    group.finish();
}
