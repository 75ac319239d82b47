//! Kit descriptions.
//!
//! A kit is a list of voices plus the chokes between them. Kits can be
//! built in code or, with the `serde` feature, read from TOML:
//!
//! ```toml
//! name = "house"
//!
//! [[voices]]
//! kind = "kick"
//! level = 0.9
//!
//! [[voices]]
//! kind = "sample"
//! name = "vox"
//! path = "samples/vox.wav"
//! looping = false
//!
//! [[chokes]]
//! trigger = 1
//! target = 0
//! ```

use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    dsp::{filter::FilterSettings, waveform::WaveformShape},
    io::WaveformLoader,
    synth::{Choke, MessageReceiver, Synth},
    voice::{
        drum::{kick, snare, Drum},
        hat::{closed_hat, open_hat, Hat},
        sample::{SampleVoice, DEFAULT_MAX_SAMPLES},
        Voice, VoiceParams,
    },
    VoiceError,
};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct KitPatch {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub voices: Vec<VoicePatch>,
    /// Indices into `voices`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub chokes: Vec<Choke>,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq)]
pub enum VoicePatch {
    Kick(PresetPatch),
    Snare(PresetPatch),
    ClosedHat(PresetPatch),
    OpenHat(PresetPatch),
    Drum(DrumPatch),
    Hat(HatPatch),
    Sample(SamplePatch),
}

/// Mix settings for a built-in drum.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct PresetPatch {
    pub level: f32,
    pub pan: f32,
    /// Hats only: decay control, 0..1 across the hat's range.
    pub time: Option<f32>,
}

impl Default for PresetPatch {
    fn default() -> Self {
        Self {
            level: 1.0,
            pan: 0.0,
            time: None,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct DrumPatch {
    pub partials: usize,
    pub filter: FilterSettings,
    pub frequencies: Vec<f32>,
    pub times: Vec<f32>,
    pub waveforms: Vec<WaveformShape>,
    pub attack_level: f32,
    pub level: f32,
    pub pan: f32,
}

impl Default for DrumPatch {
    fn default() -> Self {
        Self {
            partials: 3,
            filter: FilterSettings::default(),
            frequencies: Vec::new(),
            times: Vec::new(),
            waveforms: vec![WaveformShape::Sine],
            attack_level: 1.0,
            level: 1.0,
            pan: 0.0,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct HatPatch {
    pub min_time: f32,
    pub max_time: f32,
    pub time: f32,
    pub level: f32,
    pub pan: f32,
}

impl Default for HatPatch {
    fn default() -> Self {
        Self {
            min_time: 0.025,
            max_time: 0.2,
            time: 0.5,
            level: 1.0,
            pan: 0.0,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePatch {
    pub name: String,
    pub path: Option<PathBuf>,
    /// Fundamental of the file; estimated when absent.
    pub root: Option<f32>,
    pub desired_frequency: f32,
    pub looping: bool,
    pub loop_start: f32,
    pub loop_end: f32,
    pub max_samples: usize,
    pub level: f32,
    pub pan: f32,
}

impl Default for SamplePatch {
    fn default() -> Self {
        Self {
            name: String::from("sample"),
            path: None,
            root: None,
            desired_frequency: crate::dsp::tuning::A4_FREQUENCY,
            looping: true,
            loop_start: 0.0,
            loop_end: 1.0,
            max_samples: DEFAULT_MAX_SAMPLES,
            level: 1.0,
            pan: 0.0,
        }
    }
}

impl Default for KitPatch {
    /// Kick, snare, closed hat and open hat; the open hat cuts the closed one.
    fn default() -> Self {
        Self {
            name: String::from("default"),
            voices: vec![
                VoicePatch::Kick(PresetPatch::default()),
                VoicePatch::Snare(PresetPatch::default()),
                VoicePatch::ClosedHat(PresetPatch::default()),
                VoicePatch::OpenHat(PresetPatch::default()),
            ],
            chokes: vec![Choke {
                trigger: 3,
                target: 2,
            }],
        }
    }
}

impl KitPatch {
    #[cfg(feature = "serde")]
    pub fn from_toml_str(source: &str) -> Result<Self, VoiceError> {
        Ok(toml::from_str(source)?)
    }

    /// Build every voice into `synth` and wire up the chokes.
    ///
    /// Returns the synth indices of the new voices, in kit order. Nothing is
    /// added if any voice fails to build.
    pub fn install<R: MessageReceiver>(
        &self,
        synth: &mut Synth<R>,
        loader: &dyn WaveformLoader,
    ) -> Result<Vec<usize>, VoiceError> {
        let sample_rate = synth.sample_rate();
        let voices = self
            .voices
            .iter()
            .map(|patch| patch.build(sample_rate, loader))
            .collect::<Result<Vec<_>, _>>()?;

        let ids: Vec<usize> = voices.into_iter().map(|v| synth.add_voice(v)).collect();

        for choke in &self.chokes {
            match (ids.get(choke.trigger), ids.get(choke.target)) {
                (Some(&trigger), Some(&target)) => synth.add_choke(trigger, target),
                _ => warn!(
                    kit = %self.name,
                    trigger = choke.trigger,
                    target = choke.target,
                    "Choke refers to a voice outside the kit, ignoring"
                ),
            }
        }

        info!(kit = %self.name, voices = ids.len(), "Installed kit");
        Ok(ids)
    }
}

impl VoicePatch {
    pub fn build(
        &self,
        sample_rate: f32,
        loader: &dyn WaveformLoader,
    ) -> Result<Box<dyn Voice>, VoiceError> {
        let voice: Box<dyn Voice> = match self {
            VoicePatch::Kick(preset) => Box::new(with_mix(kick(), preset.level, preset.pan)),
            VoicePatch::Snare(preset) => Box::new(with_mix(snare(), preset.level, preset.pan)),
            VoicePatch::ClosedHat(preset) => Box::new(preset_hat(closed_hat(), preset)),
            VoicePatch::OpenHat(preset) => Box::new(preset_hat(open_hat(), preset)),
            VoicePatch::Drum(patch) => {
                let waveforms: Vec<_> = patch.waveforms.iter().map(|w| w.table()).collect();
                let mut drum = Drum::new(
                    patch.partials,
                    patch.filter,
                    &patch.frequencies,
                    &patch.times,
                    &waveforms,
                );
                drum.set_envelope_attack_level(patch.attack_level, true);
                Box::new(with_mix(drum, patch.level, patch.pan))
            }
            VoicePatch::Hat(patch) => {
                let mut hat = Hat::new(patch.min_time, patch.max_time);
                hat.set_time(patch.time);
                Box::new(with_mix(hat, patch.level, patch.pan))
            }
            VoicePatch::Sample(patch) => Box::new(build_sample(patch, sample_rate, loader)?),
        };
        Ok(voice)
    }
}

fn with_mix<V: VoiceParams>(mut voice: V, level: f32, pan: f32) -> V {
    voice.set_amplitude(level);
    voice.set_pan(pan);
    voice
}

fn preset_hat(mut hat: Hat, preset: &PresetPatch) -> Hat {
    if let Some(time) = preset.time {
        hat.set_time(time);
    }
    with_mix(hat, preset.level, preset.pan)
}

fn build_sample(
    patch: &SamplePatch,
    sample_rate: f32,
    loader: &dyn WaveformLoader,
) -> Result<SampleVoice, VoiceError> {
    let path = patch
        .path
        .as_ref()
        .ok_or_else(|| VoiceError::MissingSamplePath(patch.name.clone()))?;

    let (data, rate) = loader.load_from_file(path, patch.max_samples)?;

    let mut voice = SampleVoice::new(sample_rate as u32);
    voice.set_desired_frequency(patch.desired_frequency);
    voice.load(data, rate, patch.root);
    voice.set_loop(patch.loop_start, patch.loop_end);
    voice.set_looping(patch.looping);
    Ok(with_mix(voice, patch.level, patch.pan))
}
