//! Single-cycle waveform tables.
//!
//! Every partial plays one of these tables at its note frequency. Tables are
//! reference counted so a kit can hand the same noise table to many partials
//! without copying it, and swapping a table never allocates on the audio path.

use std::f32::consts::TAU;
use std::sync::Arc;

use rand::{rngs::SmallRng, Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shared, immutable sample buffer.
pub type Waveform = Arc<[f32]>;

/// Length of the generated single-cycle tables.
pub const WAVEFORM_SIZE: usize = 256;

// Fixed seed: every build of a kit sounds the same.
const NOISE_SEED: u64 = 0x5EED_D2B5;

/// Named table shapes, used by kit descriptions.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveformShape {
    Sine,
    OffsetSine,
    Saw,
    Square,
    Triangle,
    Noise,
    SineNoise,
    OffsetSineNoise,
}

impl WaveformShape {
    pub fn table(self) -> Waveform {
        match self {
            WaveformShape::Sine => sine(),
            WaveformShape::OffsetSine => offset_sine(),
            WaveformShape::Saw => saw(),
            WaveformShape::Square => square(),
            WaveformShape::Triangle => triangle(),
            WaveformShape::Noise => noise(),
            WaveformShape::SineNoise => sine_noise(),
            WaveformShape::OffsetSineNoise => offset_sine_noise(),
        }
    }
}

fn from_fn(f: impl Fn(f32) -> f32) -> Waveform {
    (0..WAVEFORM_SIZE)
        .map(|i| f(i as f32 / WAVEFORM_SIZE as f32))
        .collect()
}

pub fn sine() -> Waveform {
    from_fn(|phase| (TAU * phase).sin())
}

/// Sine starting at its peak (a quarter cycle ahead).
///
/// The first sample of a strike lands at full amplitude, which gives kick
/// partials their click.
pub fn offset_sine() -> Waveform {
    from_fn(|phase| (TAU * phase).cos())
}

/// Falling ramp from +1 to -1.
pub fn saw() -> Waveform {
    from_fn(|phase| 1.0 - 2.0 * phase)
}

pub fn square() -> Waveform {
    from_fn(|phase| if phase < 0.5 { 1.0 } else { -1.0 })
}

pub fn triangle() -> Waveform {
    from_fn(|phase| 1.0 - 4.0 * (phase - 0.5).abs())
}

pub fn noise() -> Waveform {
    let mut rng = SmallRng::seed_from_u64(NOISE_SEED);
    (0..WAVEFORM_SIZE)
        .map(|_| rng.gen_range(-1.0..=1.0))
        .collect()
}

/// Equal mix of a sine and noise, normalized to ±1.
pub fn sine_noise() -> Waveform {
    mix(&sine(), &noise())
}

pub fn offset_sine_noise() -> Waveform {
    mix(&offset_sine(), &noise())
}

fn mix(a: &[f32], b: &[f32]) -> Waveform {
    let mixed: Vec<f32> = a.iter().zip(b).map(|(x, y)| x + y).collect();
    let peak = mixed.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
    let scale = if peak > 0.0 { 1.0 / peak } else { 1.0 };
    mixed.into_iter().map(|x| x * scale).collect()
}
