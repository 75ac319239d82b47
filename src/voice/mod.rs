//! Playable voices and the capability interface they share.
//!
//! A voice turns `press`/`release` events into sound. The synth that owns
//! the voices calls `update` once per tick so a voice can act on time
//! (a one-shot sample stopping itself), and `render_block` once per block.
//!
//! Every voice method takes `&mut self`, so no two calls can ever overlap
//! on the same voice.

use crate::{dsp::filter::FilterType, render::RenderCtx};

pub mod drum;
pub mod hat;
pub mod oscillator;
pub mod sample;

pub use drum::Drum;
pub use hat::Hat;
pub use oscillator::OscillatorVoice;
pub use sample::{SampleTuning, SampleVoice};

/// What a voice can ask of the synth that owns it.
pub trait VoiceHost {
    /// Release the voice currently being updated.
    fn release(&mut self);
}

pub trait Voice: VoiceParams + Send {
    /// Gate the voice on. Returns false if the press was rejected.
    fn press(&mut self, note: u8, velocity: f32, ctx: &RenderCtx) -> bool;

    /// Gate the voice off. Returns true if the voice was gated.
    fn release(&mut self) -> bool;

    /// Per-tick housekeeping.
    ///
    /// Default implementation does nothing.
    fn update(&mut self, _host: &mut dyn VoiceHost, _ctx: &RenderCtx) {}

    /// Overwrite `out` with the next block of mono output.
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    fn is_pressed(&self) -> bool;

    /// True while the voice is still producing sound.
    fn is_active(&self) -> bool;

    /// Stereo position, -1.0 (left) to 1.0 (right).
    fn pan(&self) -> f32 {
        0.0
    }
}

/// One tunable parameter with its value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VoiceParam {
    Amplitude(f32),
    Pan(f32),
    /// Octaves.
    CoarseTune(f32),
    /// Octaves.
    FineTune(f32),
    /// -1.0..=1.0, scaled by the bend amount.
    Bend(f32),
    /// Octaves at full bend.
    BendAmount(f32),
    VelocityAmount(f32),
    AttackTime(f32),
    AttackLevel(f32),
    DecayTime(f32),
    SustainLevel(f32),
    ReleaseTime(f32),
    FilterType(FilterType),
    FilterFrequency(f32),
    FilterResonance(f32),
    Looping(bool),
}

/// Parameter setters a voice may support.
///
/// Every setter defaults to a no-op, so a voice implements only what it
/// has and callers can configure a mixed set of voices without asking
/// what each one supports.
pub trait VoiceParams {
    fn set_amplitude(&mut self, _value: f32) {}
    fn set_pan(&mut self, _value: f32) {}
    fn set_coarse_tune(&mut self, _octaves: f32) {}
    fn set_fine_tune(&mut self, _octaves: f32) {}
    fn set_bend(&mut self, _value: f32) {}
    fn set_bend_amount(&mut self, _octaves: f32) {}
    fn set_velocity_amount(&mut self, _value: f32) {}
    fn set_attack_time(&mut self, _seconds: f32) {}
    fn set_attack_level(&mut self, _value: f32) {}
    fn set_decay_time(&mut self, _seconds: f32) {}
    fn set_sustain_level(&mut self, _value: f32) {}
    fn set_release_time(&mut self, _seconds: f32) {}
    fn set_filter_type(&mut self, _filter_type: FilterType) {}
    fn set_filter_frequency(&mut self, _hz: f32) {}
    fn set_filter_resonance(&mut self, _value: f32) {}
    fn set_looping(&mut self, _looping: bool) {}

    fn apply(&mut self, param: VoiceParam) {
        match param {
            VoiceParam::Amplitude(v) => self.set_amplitude(v),
            VoiceParam::Pan(v) => self.set_pan(v),
            VoiceParam::CoarseTune(v) => self.set_coarse_tune(v),
            VoiceParam::FineTune(v) => self.set_fine_tune(v),
            VoiceParam::Bend(v) => self.set_bend(v),
            VoiceParam::BendAmount(v) => self.set_bend_amount(v),
            VoiceParam::VelocityAmount(v) => self.set_velocity_amount(v),
            VoiceParam::AttackTime(v) => self.set_attack_time(v),
            VoiceParam::AttackLevel(v) => self.set_attack_level(v),
            VoiceParam::DecayTime(v) => self.set_decay_time(v),
            VoiceParam::SustainLevel(v) => self.set_sustain_level(v),
            VoiceParam::ReleaseTime(v) => self.set_release_time(v),
            VoiceParam::FilterType(t) => self.set_filter_type(t),
            VoiceParam::FilterFrequency(v) => self.set_filter_frequency(v),
            VoiceParam::FilterResonance(v) => self.set_filter_resonance(v),
            VoiceParam::Looping(v) => self.set_looping(v),
        }
    }
}

/// Gate and velocity bookkeeping shared by every voice.
#[derive(Debug, Clone)]
pub struct VoiceCore {
    note: Option<u8>,
    last_note: u8,
    velocity: f32,
    velocity_amount: f32,
}

impl VoiceCore {
    pub fn new() -> Self {
        Self {
            note: None,
            last_note: crate::dsp::tuning::A4_NOTE,
            velocity: 1.0,
            velocity_amount: 1.0,
        }
    }

    /// Gate on. Rejected when the same note is already gated.
    pub fn press(&mut self, note: u8, velocity: f32) -> bool {
        if self.note == Some(note) {
            return false;
        }
        self.note = Some(note);
        self.last_note = note;
        self.velocity = velocity.clamp(0.0, 1.0);
        true
    }

    /// Gate off. Returns true if a note was gated.
    pub fn release(&mut self) -> bool {
        self.note.take().is_some()
    }

    pub fn is_pressed(&self) -> bool {
        self.note.is_some()
    }

    pub fn note(&self) -> Option<u8> {
        self.note
    }

    /// The gated note, or the most recent one after release.
    pub fn last_note(&self) -> u8 {
        self.last_note
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn velocity_amount(&self) -> f32 {
        self.velocity_amount
    }

    pub fn set_velocity_amount(&mut self, value: f32) {
        self.velocity_amount = value.clamp(0.0, 1.0);
    }

    /// Attack-level multiplier for the current velocity.
    ///
    /// With a velocity amount of 0 every strike peaks at full level; with 1
    /// the peak follows velocity exactly.
    pub fn velocity_mod(&self) -> f32 {
        1.0 - self.velocity_amount * (1.0 - self.velocity)
    }
}

impl Default for VoiceCore {
    fn default() -> Self {
        Self::new()
    }
}
