use crate::{
    dsp::{
        envelope::{Envelope, EnvelopeParams},
        tuning::octaves_to_ratio,
        waveform::Waveform,
    },
    render::RenderCtx,
};

/*
Wavetable Note
==============

A Note is one partial: a waveform played at a frequency, shaped by its own
envelope. Voices layer notes to build a sound. A kick is three of them; a
sample voice is one note whose waveform is a whole recording.

Playback
--------

One cycle of the note frequency reads the loop range once:

    samples_per_second = frequency × 2^bend × loop_len

so a 256-sample table at 100 Hz advances 25600 table samples per second,
and a recording tuned with `sample_tune` replays at its native rate. Reads
between table samples are linearly interpolated; the read position wraps
inside [loop_start, loop_end).

Bend
----

The bend input is an octave offset applied as 2^bend. A static bend is
stored on the note. A sweep bend is resolved by the caller: the owning voice
passes its modulator's current value into `render_add`, so every partial of
a drum reads the same modulator without holding a copy of it.
*/

/// Where a note reads its pitch bend from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BendInput {
    /// The owning voice's shared pitch sweep.
    Sweep,
    /// A fixed offset in octaves.
    Static(f32),
}

impl Default for BendInput {
    fn default() -> Self {
        BendInput::Static(0.0)
    }
}

pub struct Note {
    frequency: f32,
    waveform: Option<Waveform>,
    envelope: Envelope,
    amplitude: f32,
    bend: BendInput,

    loop_start: usize, // inclusive sample index
    loop_end: usize,   // exclusive sample index

    position: f32, // read offset from loop_start, in samples
}

impl Note {
    pub fn new(frequency: f32, waveform: Option<Waveform>) -> Self {
        let loop_end = waveform.as_ref().map_or(0, |w| w.len());
        Self {
            frequency,
            waveform,
            envelope: Envelope::new(EnvelopeParams::default()),
            amplitude: 1.0,
            bend: BendInput::default(),
            loop_start: 0,
            loop_end,
            position: 0.0,
        }
    }

    pub fn with_envelope(mut self, params: EnvelopeParams) -> Self {
        self.envelope.set_params(params);
        self
    }

    pub fn with_bend(mut self, bend: BendInput) -> Self {
        self.bend = bend;
        self
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency.max(0.0);
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.amplitude = amplitude.max(0.0);
    }

    pub fn bend(&self) -> BendInput {
        self.bend
    }

    pub fn set_bend(&mut self, bend: BendInput) {
        self.bend = bend;
    }

    pub fn waveform(&self) -> Option<&Waveform> {
        self.waveform.as_ref()
    }

    /// Swap the waveform and reset the loop to cover all of it.
    pub fn set_waveform(&mut self, waveform: Option<Waveform>) {
        self.loop_start = 0;
        self.loop_end = waveform.as_ref().map_or(0, |w| w.len());
        self.waveform = waveform;
        self.position = 0.0;
    }

    pub fn envelope(&self) -> &EnvelopeParams {
        self.envelope.params()
    }

    /// Replace the envelope shape. A sounding note keeps its current level.
    pub fn set_envelope(&mut self, params: EnvelopeParams) {
        self.envelope.set_params(params);
    }

    /// Loop bounds as fractions of the waveform length.
    ///
    /// Both ends are clamped to `[0, 1]` and `end` is never before `start`.
    pub fn set_loop(&mut self, start: f32, end: f32) {
        let len = self.waveform.as_ref().map_or(0, |w| w.len());
        let start = start.clamp(0.0, 1.0);
        let end = end.clamp(start, 1.0);

        self.loop_start = (start * len as f32).round() as usize;
        self.loop_end = ((end * len as f32).round() as usize).clamp(self.loop_start, len);
        self.position = self.position.min(self.loop_len().saturating_sub(1) as f32);
    }

    pub fn loop_bounds(&self) -> (usize, usize) {
        (self.loop_start, self.loop_end)
    }

    pub fn loop_len(&self) -> usize {
        self.loop_end - self.loop_start
    }

    /// Start the note from the top of its loop.
    pub fn press(&mut self) {
        self.position = 0.0;
        self.envelope.note_on();
    }

    pub fn release(&mut self) {
        self.envelope.note_off();
    }

    pub fn is_active(&self) -> bool {
        self.envelope.is_active()
    }

    pub fn level(&self) -> f32 {
        self.envelope.level()
    }

    /// Bend in octaves after resolving a sweep input against `sweep`.
    #[inline]
    pub fn bend_octaves(&self, sweep: f32) -> f32 {
        match self.bend {
            BendInput::Sweep => sweep,
            BendInput::Static(octaves) => octaves,
        }
    }

    /// Mix this note into `out`.
    ///
    /// `sweep` is the owning voice's modulator value for this chunk, in
    /// octaves; notes with a static bend ignore it.
    pub fn render_add(&mut self, out: &mut [f32], ctx: &RenderCtx, sweep: f32) {
        if !self.envelope.is_active() {
            return;
        }

        let Some(table) = self.waveform.as_deref() else {
            // Nothing to play, but the envelope still runs its course.
            for _ in out.iter() {
                self.envelope.next_sample(ctx);
            }
            return;
        };

        if table.is_empty() {
            return;
        }

        let loop_len = self.loop_len().max(1);
        let last = table.len() - 1;
        let frequency = self.frequency * octaves_to_ratio(self.bend_octaves(sweep));
        let increment = frequency * loop_len as f32 / ctx.sample_rate;
        let wrap = loop_len as f32;

        for sample in out.iter_mut() {
            self.envelope.next_sample(ctx);

            let index = self.position as usize;
            let frac = self.position - index as f32;
            let a_idx = (self.loop_start + index).min(last);
            let b_idx = if index + 1 >= loop_len {
                self.loop_start.min(last)
            } else {
                (a_idx + 1).min(last)
            };
            let value = table[a_idx] + (table[b_idx] - table[a_idx]) * frac;

            *sample += value * self.envelope.level() * self.amplitude;

            self.position += increment;
            if self.position >= wrap {
                self.position %= wrap;
            }
        }
    }
}
