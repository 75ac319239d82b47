#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{render::RenderCtx, MIN_TIME};

/*
ADSR Envelope Implementation
============================

This module implements a linear ADSR envelope generator with a configurable
peak ("attack level"). It is the amplitude contour of every note a voice plays.

Vocabulary
----------

  level         The envelope's current output value (0.0 to attack_level).
                This multiplies the audio signal to control its amplitude.

  attack_level  The peak reached at the end of the attack. Voices scale it
                by velocity, so a soft strike peaks lower.

  stage         Which phase of the envelope we're in: Idle, Attack, Decay,
                Sustain, or Release. A state machine governs transitions.

  gate          The note on/off signal. Gate high (note_on) triggers Attack.
                Gate low (note_off) triggers Release from wherever we are.


The Shape: Linear Ramps
-----------------------

  Level
    peak ┐    ╱╲
         │   ╱  ╲___________
    S    │  ╱               ╲
         │ ╱                 ╲
    0.0  └╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release


Percussive (Pure Decay) Envelopes
---------------------------------

Drum partials use attack_time = 0, sustain_level = 0 and release_time = 0:

  Level
    peak ┐╲
         │ ╲
         │  ╲
    0.0  └───╲────→ Time
          Decay

The envelope jumps to the peak on the first sample, ramps down over the
decay time and goes straight back to Idle once it reaches zero. There is no
sustain to hold, so the note ends by itself. A note_off during the decay
(release_time = 0) silences it on the next sample: that's how an open hi-hat
gets damped.


The Math: Time to Increment
---------------------------

    increment = target_change / (time_seconds * sample_rate)

Times are clamped to MIN_TIME (one sample at 48 kHz), so a zero time becomes
a one-sample step instead of a division by zero.

Release is special: we snapshot the starting level at note_off and
interpolate over elapsed seconds. note_off doesn't need the sample rate, so
voices can release without a render context.
*/

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // Gate low, envelope inactive, level = 0
    Attack,  // Gate just went high, ramping up to attack_level
    Decay,   // Reached peak, ramping down to sustain level
    Sustain, // Holding at sustain level while gate is high
    Release, // Gate went low, ramping down to 0
}

/// Envelope shape. Times in seconds, levels in 0.0..=1.0.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    pub attack_time: f32,
    pub attack_level: f32,
    pub decay_time: f32,
    pub sustain_level: f32,
    pub release_time: f32,
}

impl EnvelopeParams {
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack_time: attack,
            attack_level: 1.0,
            decay_time: decay,
            sustain_level: sustain,
            release_time: release,
        }
    }

    /// Instant attack, linear decay to silence, no sustain or release.
    pub fn percussive(decay: f32, attack_level: f32) -> Self {
        Self {
            attack_time: 0.0,
            attack_level,
            decay_time: decay,
            sustain_level: 0.0,
            release_time: 0.0,
        }
    }
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            attack_time: 0.01,  // 10ms default
            attack_level: 1.0,  // full peak
            decay_time: 0.1,    // 100ms default
            sustain_level: 0.7, // 70% level default
            release_time: 0.3,  // 300ms default
        }
    }
}

pub struct Envelope {
    // Shape (set by the owning voice)
    params: EnvelopeParams,

    // Runtime state (changes every sample)
    stage: EnvelopeState, // current stage of the state machine
    level: f32,           // current output value

    // Decay bookkeeping
    decay_start_level: f32, // level when decay began (usually attack_level)

    // Release bookkeeping
    release_start_level: f32, // level when release began
    release_elapsed: f32,     // seconds elapsed since release began
}

impl Envelope {
    pub fn new(params: EnvelopeParams) -> Self {
        Self {
            params: Self::sanitize(params),

            stage: EnvelopeState::Idle,
            level: 0.0,
            decay_start_level: 0.0,
            release_start_level: 0.0,
            release_elapsed: 0.0,
        }
    }

    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self::new(EnvelopeParams::adsr(attack, decay, sustain, release))
    }

    fn sanitize(params: EnvelopeParams) -> EnvelopeParams {
        let attack_level = params.attack_level.clamp(0.0, 1.0);
        EnvelopeParams {
            attack_time: params.attack_time.max(0.0),
            attack_level,
            decay_time: params.decay_time.max(MIN_TIME),
            sustain_level: params.sustain_level.clamp(0.0, attack_level),
            release_time: params.release_time.max(0.0),
        }
    }

    /// Replace the shape without touching the running stage or level.
    ///
    /// A note that is already sounding continues from its current level with
    /// the new times, so retuning an envelope never restarts the sound.
    pub fn set_params(&mut self, params: EnvelopeParams) {
        self.params = Self::sanitize(params);
    }

    pub fn params(&self) -> &EnvelopeParams {
        &self.params
    }

    /// Gate high: start the attack phase from zero.
    ///
    /// This resets the envelope for a clean retrigger - essential for
    /// repeated notes to sound distinct rather than "tied together".
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeState::Attack;
        self.release_elapsed = 0.0;
    }

    /// Gate low: start the release phase from current level.
    pub fn note_off(&mut self) {
        if matches!(self.stage, EnvelopeState::Idle | EnvelopeState::Release) {
            return;
        }

        self.release_start_level = self.level;
        self.release_elapsed = 0.0;
        self.stage = EnvelopeState::Release;
    }

    /// Advance the envelope by one sample. Called once per sample.
    pub fn next_sample(&mut self, ctx: &RenderCtx) {
        let peak = self.params.attack_level;

        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                if self.params.attack_time <= MIN_TIME {
                    self.level = peak;
                } else {
                    let increment = peak / (self.params.attack_time * ctx.sample_rate);
                    self.level += increment;
                }

                if self.level >= peak {
                    self.level = peak;
                    self.decay_start_level = peak;
                    self.stage = EnvelopeState::Decay;
                }
            }

            EnvelopeState::Decay => {
                // Ramp from decay_start_level down to sustain_level
                let target = self.params.sustain_level;
                let total_drop = self.decay_start_level - target;
                let decrement = total_drop / (self.params.decay_time * ctx.sample_rate);
                self.level -= decrement;

                if self.level <= target || decrement <= 0.0 {
                    self.level = target;
                    self.stage = if target <= 0.0 {
                        EnvelopeState::Idle
                    } else {
                        EnvelopeState::Sustain
                    };
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.params.sustain_level;
            }

            EnvelopeState::Release => {
                let release_time = self.params.release_time;
                if release_time <= MIN_TIME {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                } else {
                    // level = start * (1 - elapsed/total)
                    let progress = self.release_elapsed / release_time;
                    self.level = (self.release_start_level * (1.0 - progress)).max(0.0);
                    self.release_elapsed += 1.0 / ctx.sample_rate;

                    if self.release_elapsed >= release_time {
                        self.level = 0.0;
                        self.stage = EnvelopeState::Idle;
                    }
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        for sample in buffer.iter_mut() {
            self.next_sample(ctx);
            *sample = self.level;
        }
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle)
    }

    /// Reset to idle state.
    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.decay_start_level = 0.0;
        self.release_elapsed = 0.0;
        self.release_start_level = 0.0;
    }

    /// Get the current envelope level
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Get the current envelope stage
    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn render_samples(env: &mut Envelope, samples: usize) {
        let ctx = RenderCtx::new(SAMPLE_RATE, 0.0);
        for _ in 0..samples {
            env.next_sample(&ctx);
        }
    }

    #[test]
    fn attack_reaches_full_level() {
        let mut env = Envelope::adsr(0.01, 0.1, 0.7, 0.2);

        env.note_on();
        render_samples(&mut env, (0.01 * SAMPLE_RATE) as usize + 1);

        assert!(env.level() > 0.99, "expected attack to reach full level");
        assert_ne!(env.state(), EnvelopeState::Attack);
    }

    #[test]
    fn attack_stops_at_attack_level() {
        let mut env = Envelope::new(EnvelopeParams {
            attack_level: 0.5,
            ..EnvelopeParams::adsr(0.01, 0.1, 0.2, 0.2)
        });

        env.note_on();
        let mut buffer = vec![0.0; 20];
        env.render(&mut buffer, &RenderCtx::new(SAMPLE_RATE, 0.0));

        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x));
        assert!((peak - 0.5).abs() < 1e-3, "peak was {peak}");
    }

    #[test]
    fn sustain_holds_target_level() {
        let sustain = 0.6;
        let mut env = Envelope::adsr(0.01, 0.05, sustain, 0.2);

        env.note_on();
        let attack_decay_samples = ((0.01 + 0.05) * SAMPLE_RATE) as usize + 5;
        render_samples(&mut env, attack_decay_samples);

        assert_eq!(env.state(), EnvelopeState::Sustain);
        assert!((env.level() - sustain).abs() < 0.05, "sustain level should be held");
    }

    #[test]
    fn release_falls_back_to_idle() {
        let release = 0.03;
        let mut env = Envelope::adsr(0.01, 0.05, 0.5, release);

        env.note_on();
        render_samples(&mut env, (0.02 * SAMPLE_RATE) as usize);

        env.note_off();
        render_samples(&mut env, (release * SAMPLE_RATE) as usize + 2);

        assert!(env.level() <= 0.001, "release should fall back to zero");
        assert_eq!(env.state(), EnvelopeState::Idle);
    }

    #[test]
    fn percussive_jumps_to_peak_and_decays_to_idle() {
        let mut env = Envelope::new(EnvelopeParams::percussive(0.05, 0.8));

        env.note_on();
        render_samples(&mut env, 1);
        assert!((env.level() - 0.8).abs() < 1e-6, "first sample should be the peak");

        render_samples(&mut env, (0.05 * SAMPLE_RATE) as usize + 2);
        assert_eq!(env.state(), EnvelopeState::Idle);
        assert!(!env.is_active());
    }

    #[test]
    fn zero_release_silences_immediately() {
        let mut env = Envelope::new(EnvelopeParams::percussive(1.0, 1.0));

        env.note_on();
        render_samples(&mut env, 10);
        assert!(env.level() > 0.9);

        env.note_off();
        render_samples(&mut env, 1);
        assert_eq!(env.level(), 0.0);
        assert_eq!(env.state(), EnvelopeState::Idle);
    }

    #[test]
    fn set_params_keeps_running_stage() {
        let mut env = Envelope::new(EnvelopeParams::percussive(1.0, 1.0));

        env.note_on();
        render_samples(&mut env, 100);
        let before = env.level();

        env.set_params(EnvelopeParams::percussive(2.0, 1.0));
        assert_eq!(env.state(), EnvelopeState::Decay);
        assert_eq!(env.level(), before);
        assert_eq!(env.params().decay_time, 2.0);
    }

    #[test]
    fn non_positive_decay_is_clamped() {
        let env = Envelope::new(EnvelopeParams::percussive(0.0, 1.0));
        assert!(env.params().decay_time > 0.0);
    }
}
