//! Generic pitched single-note voice.
//!
//! One wavetable note through an ADSR envelope and a filter. Pitch follows
//! the pressed MIDI note, shifted by coarse and fine tune, bent live by the
//! pitch wheel, and multiplied by a correction ratio that the sample voice
//! uses to retune recordings.

use crate::{
    dsp::{
        envelope::EnvelopeParams,
        filter::{FilterSettings, FilterType, SVFilter},
        note::{BendInput, Note},
        tuning::{midi_note_to_freq, octaves_to_ratio},
        waveform::{self, Waveform},
    },
    render::RenderCtx,
    voice::{Voice, VoiceCore, VoiceParams},
};

/// Bend range at full pitch-wheel deflection: two semitones.
pub const DEFAULT_BEND_AMOUNT: f32 = 1.0 / 6.0;

pub struct OscillatorVoice {
    core: VoiceCore,
    note: Note,
    envelope: EnvelopeParams,
    filter: SVFilter,
    pan: f32,

    coarse_tune: f32, // octaves
    fine_tune: f32,   // octaves
    bend: f32,        // -1.0..=1.0
    bend_amount: f32, // octaves at full bend
    correction: f32,  // frequency ratio
}

impl OscillatorVoice {
    pub fn new(waveform: Option<Waveform>) -> Self {
        let envelope = EnvelopeParams::default();
        Self {
            core: VoiceCore::new(),
            note: Note::new(midi_note_to_freq(crate::dsp::tuning::A4_NOTE), waveform)
                .with_envelope(envelope),
            envelope,
            filter: SVFilter::from_settings(FilterSettings::open()),
            pan: 0.0,
            coarse_tune: 0.0,
            fine_tune: 0.0,
            bend: 0.0,
            bend_amount: DEFAULT_BEND_AMOUNT,
            correction: 1.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(Some(waveform::sine()))
    }

    pub fn with_envelope(mut self, params: EnvelopeParams) -> Self {
        self.set_envelope(params);
        self
    }

    pub fn core(&self) -> &VoiceCore {
        &self.core
    }

    pub fn note(&self) -> &Note {
        &self.note
    }

    pub fn note_mut(&mut self) -> &mut Note {
        &mut self.note
    }

    pub fn set_waveform(&mut self, waveform: Option<Waveform>) {
        self.note.set_waveform(waveform);
    }

    pub fn set_envelope(&mut self, params: EnvelopeParams) {
        self.envelope = params;
        self.update_envelope();
    }

    pub fn envelope(&self) -> &EnvelopeParams {
        &self.envelope
    }

    pub fn filter(&self) -> FilterSettings {
        self.filter.settings()
    }

    pub fn set_filter(&mut self, settings: FilterSettings) {
        self.filter.apply(settings);
    }

    /// Ratio applied on top of the note frequency.
    pub fn correction(&self) -> f32 {
        self.correction
    }

    pub fn set_correction(&mut self, ratio: f32) {
        self.correction = if ratio.is_finite() && ratio > 0.0 {
            ratio
        } else {
            1.0
        };
        self.update_root();
    }

    /// Current live bend in octaves.
    pub fn bend_octaves(&self) -> f32 {
        self.bend * self.bend_amount
    }

    /// Frequency of the current (or last) note before bend.
    pub fn base_frequency(&self) -> f32 {
        midi_note_to_freq(self.core.last_note())
            * octaves_to_ratio(self.coarse_tune + self.fine_tune)
            * self.correction
    }

    fn update_root(&mut self) {
        let frequency = self.base_frequency();
        self.note.set_frequency(frequency);
    }

    fn update_bend(&mut self) {
        self.note.set_bend(BendInput::Static(self.bend_octaves()));
    }

    fn update_envelope(&mut self) {
        let params = EnvelopeParams {
            attack_level: self.envelope.attack_level * self.core.velocity_mod(),
            ..self.envelope
        };
        self.note.set_envelope(params);
    }
}

impl Voice for OscillatorVoice {
    fn press(&mut self, note: u8, velocity: f32, _ctx: &RenderCtx) -> bool {
        if !self.core.press(note, velocity) {
            return false;
        }
        self.update_root();
        self.update_bend();
        self.update_envelope();
        self.note.press();
        true
    }

    fn release(&mut self) -> bool {
        if !self.core.release() {
            return false;
        }
        self.note.release();
        true
    }

    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        out.fill(0.0);
        if !self.note.is_active() {
            return;
        }
        self.note.render_add(out, ctx, 0.0);
        self.filter.render(out, ctx);
    }

    fn is_pressed(&self) -> bool {
        self.core.is_pressed()
    }

    fn is_active(&self) -> bool {
        self.note.is_active()
    }

    fn pan(&self) -> f32 {
        self.pan
    }
}

impl VoiceParams for OscillatorVoice {
    fn set_amplitude(&mut self, value: f32) {
        self.note.set_amplitude(value);
    }

    fn set_pan(&mut self, value: f32) {
        self.pan = value.clamp(-1.0, 1.0);
    }

    fn set_coarse_tune(&mut self, octaves: f32) {
        self.coarse_tune = octaves;
        self.update_root();
    }

    fn set_fine_tune(&mut self, octaves: f32) {
        self.fine_tune = octaves;
        self.update_root();
    }

    fn set_bend(&mut self, value: f32) {
        self.bend = value.clamp(-1.0, 1.0);
        self.update_bend();
    }

    fn set_bend_amount(&mut self, octaves: f32) {
        self.bend_amount = octaves;
        self.update_bend();
    }

    fn set_velocity_amount(&mut self, value: f32) {
        self.core.set_velocity_amount(value);
        self.update_envelope();
    }

    fn set_attack_time(&mut self, seconds: f32) {
        self.envelope.attack_time = seconds;
        self.update_envelope();
    }

    fn set_attack_level(&mut self, value: f32) {
        self.envelope.attack_level = value;
        self.update_envelope();
    }

    fn set_decay_time(&mut self, seconds: f32) {
        self.envelope.decay_time = seconds;
        self.update_envelope();
    }

    fn set_sustain_level(&mut self, value: f32) {
        self.envelope.sustain_level = value;
        self.update_envelope();
    }

    fn set_release_time(&mut self, seconds: f32) {
        self.envelope.release_time = seconds;
        self.update_envelope();
    }

    fn set_filter_type(&mut self, filter_type: FilterType) {
        self.filter.set_type(filter_type);
    }

    fn set_filter_frequency(&mut self, hz: f32) {
        self.filter.set_cutoff(hz);
    }

    fn set_filter_resonance(&mut self, value: f32) {
        self.filter.set_resonance(value);
    }
}
