//! Multi-partial percussive voice.
//!
//! A drum strike is a handful of short partials, each a wavetable note with
//! a pure-decay envelope, mixed through one shared filter. All partials are
//! bent by the same one-shot pitch sweep, so every strike starts sharp and
//! drops into place together.
//!
//! # How It Works
//!
//! 1. `press` retriggers the sweep and restarts every partial at the peak
//! 2. Each partial decays linearly over its own time
//! 3. The sweep falls 0.6 octaves over the first 50ms
//! 4. The shared filter shapes the mix (low-pass for kicks, high-pass for hats)
//!
//! Partial settings are given as short lists reused cyclically: with three
//! partials and `times = [0.1]`, every partial decays over 0.1s.

use crate::{
    dsp::{
        envelope::EnvelopeParams,
        filter::{FilterSettings, FilterType, SVFilter},
        note::{BendInput, Note},
        sweep::PitchSweep,
        waveform::{self, Waveform},
    },
    render::RenderCtx,
    voice::{Voice, VoiceCore, VoiceParams},
};

/// Samples rendered per sweep step.
pub const CONTROL_BLOCK: usize = 32;

pub struct Drum {
    core: VoiceCore,
    notes: Vec<Note>,
    sweep: PitchSweep,
    filter: SVFilter,
    times: Vec<f32>,
    attack_level: f32,
    pan: f32,
}

impl Drum {
    /// Build a drum with `count` partials (at least one).
    ///
    /// Empty `frequencies` default to 440 Hz and empty `times` to 1s. An
    /// empty `waveforms` list leaves the partials without a table (silent).
    pub fn new(
        count: usize,
        filter: FilterSettings,
        frequencies: &[f32],
        times: &[f32],
        waveforms: &[Waveform],
    ) -> Self {
        let frequencies: &[f32] = if frequencies.is_empty() {
            &[440.0]
        } else {
            frequencies
        };
        let times: &[f32] = if times.is_empty() { &[1.0] } else { times };

        let notes = (0..count.max(1))
            .map(|i| Note::new(frequencies[i % frequencies.len()], None).with_bend(BendInput::Sweep))
            .collect();

        let mut drum = Self {
            core: VoiceCore::new(),
            notes,
            sweep: PitchSweep::drum(),
            filter: SVFilter::from_settings(filter),
            times: Vec::new(),
            attack_level: 1.0,
            pan: 0.0,
        };
        drum.set_times(times);
        drum.set_waveforms(waveforms);
        drum
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn sweep(&self) -> &PitchSweep {
        &self.sweep
    }

    pub fn times(&self) -> &[f32] {
        &self.times
    }

    pub fn attack_level(&self) -> f32 {
        self.attack_level
    }

    pub fn filter(&self) -> FilterSettings {
        self.filter.settings()
    }

    pub fn set_filter(&mut self, settings: FilterSettings) {
        self.filter.apply(settings);
    }

    pub fn set_frequencies(&mut self, values: &[f32]) {
        if values.is_empty() {
            return;
        }
        for (i, note) in self.notes.iter_mut().enumerate() {
            note.set_frequency(values[i % values.len()]);
        }
    }

    /// Replace the decay list and recompute every envelope.
    ///
    /// Does not retrigger the sweep. An empty list is ignored.
    pub fn set_times(&mut self, values: &[f32]) {
        if values.is_empty() {
            return;
        }
        self.times.clear();
        self.times.extend_from_slice(values);
        self.update_envelope();
    }

    pub fn set_waveforms(&mut self, values: &[Waveform]) {
        if values.is_empty() {
            return;
        }
        for (i, note) in self.notes.iter_mut().enumerate() {
            note.set_waveform(Some(values[i % values.len()].clone()));
        }
    }

    /// Per-partial amplitude.
    pub fn set_level(&mut self, value: f32) {
        for note in &mut self.notes {
            note.set_amplitude(value);
        }
    }

    /// Set the peak of every strike, clamped to `[0, 1]`.
    ///
    /// With `recompute` false the new level takes effect at the next press
    /// or envelope change.
    pub fn set_envelope_attack_level(&mut self, value: f32, recompute: bool) {
        self.attack_level = value.clamp(0.0, 1.0);
        if recompute {
            self.update_envelope();
        }
    }

    fn update_envelope(&mut self) {
        let peak = self.core.velocity_mod() * self.attack_level;
        let times = &self.times;
        for (i, note) in self.notes.iter_mut().enumerate() {
            note.set_envelope(EnvelopeParams::percussive(times[i % times.len()], peak));
        }
    }
}

impl Voice for Drum {
    fn press(&mut self, note: u8, velocity: f32, _ctx: &RenderCtx) -> bool {
        if !self.core.press(note, velocity) {
            return false;
        }
        self.sweep.retrigger();
        self.update_envelope();
        for partial in &mut self.notes {
            partial.press();
        }
        true
    }

    /// Gate off. Partials have no release time, so they stop on the next
    /// sample. Always returns false: drums finish on their own.
    fn release(&mut self) -> bool {
        self.core.release();
        for partial in &mut self.notes {
            partial.release();
        }
        false
    }

    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        out.fill(0.0);
        if !self.is_active() {
            return;
        }

        for chunk in out.chunks_mut(CONTROL_BLOCK) {
            let sweep = self.sweep.value();
            for partial in &mut self.notes {
                partial.render_add(chunk, ctx, sweep);
            }
            self.sweep.advance(chunk.len(), ctx);
        }

        self.filter.render(out, ctx);
    }

    fn is_pressed(&self) -> bool {
        self.core.is_pressed()
    }

    fn is_active(&self) -> bool {
        self.notes.iter().any(Note::is_active)
    }

    fn pan(&self) -> f32 {
        self.pan
    }
}

impl VoiceParams for Drum {
    fn set_amplitude(&mut self, value: f32) {
        self.set_level(value);
    }

    fn set_pan(&mut self, value: f32) {
        self.pan = value.clamp(-1.0, 1.0);
    }

    fn set_velocity_amount(&mut self, value: f32) {
        self.core.set_velocity_amount(value);
        self.update_envelope();
    }

    fn set_attack_level(&mut self, value: f32) {
        self.set_envelope_attack_level(value, true);
    }

    fn set_decay_time(&mut self, seconds: f32) {
        self.set_times(&[seconds]);
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

/// Three sine partials under a 2 kHz low-pass.
pub fn kick() -> Drum {
    Drum::new(
        3,
        FilterSettings::lowpass(2_000.0),
        &[53.0, 72.0, 41.0],
        &[0.075, 0.055, 0.095],
        &[waveform::offset_sine(), waveform::sine(), waveform::offset_sine()],
    )
}

/// Three noisy sine partials under a 9.5 kHz low-pass.
pub fn snare() -> Drum {
    let offset = waveform::offset_sine_noise();
    Drum::new(
        3,
        FilterSettings::lowpass(9_500.0),
        &[90.0, 135.0, 165.0],
        &[0.115, 0.095, 0.115],
        &[waveform::sine_noise(), offset.clone(), offset],
    )
}
