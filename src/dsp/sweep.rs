use crate::render::RenderCtx;

/*
Pitch-Sweep Modulator
=====================

A one-shot modulation source that bends the pitch of a drum strike. It is
an LFO that runs exactly one cycle per trigger and then holds its final
value.

Vocabulary
----------

  rate      Cycles per second. At 20 Hz one sweep lasts 1/20 = 50ms.

  scale     Half the swing of the sweep, in octaves.

  offset    Center of the sweep, in octaves.

  once      Stop at the end of the first cycle instead of wrapping.

  value     offset + scale × ramp(phase), in octaves. Consumers apply it as
            a frequency multiplier: frequency × 2^value.


The Shape
---------

The ramp falls from +1 to -1, so the pitch starts high and drops:

  value (octaves)
  0.63 ┐╲
       │ ╲
       │  ╲
  0.03 └───╲________________  (held)
       0   50ms           → Time

With the drum defaults (rate 20, scale 0.3, offset 0.33) a strike starts
0.63 octaves above its partial frequencies and settles 0.03 octaves above
within 50ms.


One Modulator, Many Partials
----------------------------

A drum voice owns one sweep and every partial reads it. Retriggering the
sweep once restarts the drop for all partials together, phase-locked, at the
cost of one modulator instead of N.

The sweep is advanced at control rate by its owner: the owner reads
`value()`, renders a short chunk of every partial with it, then calls
`advance()` for that chunk.
*/

/// Sweep rate used by drum voices (Hz).
pub const DRUM_SWEEP_RATE: f32 = 20.0;
/// Sweep scale used by drum voices (octaves).
pub const DRUM_SWEEP_SCALE: f32 = 0.3;
/// Sweep offset used by drum voices (octaves).
pub const DRUM_SWEEP_OFFSET: f32 = 0.33;

#[derive(Debug, Clone)]
pub struct PitchSweep {
    rate: f32,
    scale: f32,
    offset: f32,
    once: bool,
    phase: f32, // 0.0 at trigger, 1.0 at the end of the cycle
    retriggers: u64,
}

impl PitchSweep {
    /// A one-shot sweep. Holds its end value until the first retrigger.
    pub fn new(rate: f32, scale: f32, offset: f32) -> Self {
        Self {
            rate: rate.max(0.0),
            scale,
            offset,
            once: true,
            phase: 1.0,
            retriggers: 0,
        }
    }

    /// The sweep every drum voice uses.
    pub fn drum() -> Self {
        Self::new(DRUM_SWEEP_RATE, DRUM_SWEEP_SCALE, DRUM_SWEEP_OFFSET)
    }

    /// Free-running variant: wraps at the end of each cycle.
    pub fn looping(mut self) -> Self {
        self.once = false;
        self
    }

    /// Restart from the initial phase.
    pub fn retrigger(&mut self) {
        self.phase = 0.0;
        self.retriggers = self.retriggers.wrapping_add(1);
    }

    /// Current modulation in octaves.
    #[inline]
    pub fn value(&self) -> f32 {
        let ramp = 1.0 - 2.0 * self.phase;
        self.offset + self.scale * ramp
    }

    /// Advance by `frames` samples.
    pub fn advance(&mut self, frames: usize, ctx: &RenderCtx) {
        if self.once && self.phase >= 1.0 {
            return;
        }

        self.phase += self.rate * ctx.frames_to_seconds(frames);

        if self.once {
            self.phase = self.phase.min(1.0);
        } else {
            self.phase = self.phase.fract();
        }
    }

    /// True while a one-shot sweep is still moving.
    pub fn is_running(&self) -> bool {
        self.phase < 1.0
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Number of times this sweep has been retriggered.
    pub fn retrigger_count(&self) -> u64 {
        self.retriggers
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }
}

impl Default for PitchSweep {
    fn default() -> Self {
        Self::drum()
    }
}
