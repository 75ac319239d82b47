//! Benchmarks for a whole kit mixed to stereo.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use voicekit::{
    io::WaveformLoader,
    patch::{KitPatch, SamplePatch, VoicePatch},
    synth::Synth,
    VoiceError,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

/// Serves a generated tone instead of reading from disk.
struct ToneLoader;

impl WaveformLoader for ToneLoader {
    fn load_from_file(
        &self,
        _path: &std::path::Path,
        max_samples: usize,
    ) -> Result<(Vec<f32>, u32), VoiceError> {
        let data = (0..max_samples)
            .map(|i| (2.0 * std::f32::consts::PI * 330.0 * i as f32 / 44_100.0).sin())
            .collect();
        Ok((data, 44_100))
    }
}

fn kit_synth(kit: &KitPatch) -> Synth {
    let mut synth = Synth::new(SAMPLE_RATE);
    let ids = kit
        .install(&mut synth, &ToneLoader)
        .expect("kit should install");
    for (i, id) in ids.into_iter().enumerate() {
        synth.press(id, 36 + i as u8, 1.0);
    }
    synth
}

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/mix");

    let drums = KitPatch::default();
    let mut with_sample = KitPatch::default();
    with_sample.voices.push(VoicePatch::Sample(SamplePatch {
        name: String::from("tone"),
        path: Some("tone.wav".into()),
        ..SamplePatch::default()
    }));

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        let mut synth = kit_synth(&drums);
        group.bench_with_input(BenchmarkId::new("drums", size), &size, |b, _| {
            b.iter(|| synth.render_block(black_box(&mut left), black_box(&mut right)))
        });

        let mut synth = kit_synth(&with_sample);
        group.bench_with_input(BenchmarkId::new("drums_and_sample", size), &size, |b, _| {
            b.iter(|| synth.render_block(black_box(&mut left), black_box(&mut right)))
        });
    }

    group.finish();
}
