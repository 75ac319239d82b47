// Purpose: Owns the voices, drives them once per block, mixes them to stereo

use std::collections::VecDeque;
use std::f32::consts::FRAC_PI_4;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    render::RenderCtx,
    voice::{Voice, VoiceHost, VoiceParam},
    MAX_BLOCK_SIZE,
};

pub mod clock;
pub mod message;

pub use clock::FrameClock;
pub use message::{MessageReceiver, SynthMessage};

/// Pressing `trigger` releases `target` (an open hat cutting a closed one).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choke {
    pub trigger: usize,
    pub target: usize,
}

/// Collects auto-stop requests during the update pass.
struct ReleaseQueue<'a> {
    pending: &'a mut Vec<usize>,
    voice: usize,
}

impl VoiceHost for ReleaseQueue<'_> {
    fn release(&mut self) {
        if !self.pending.contains(&self.voice) {
            self.pending.push(self.voice);
        }
    }
}

/// A fixed set of voices addressed by index.
///
/// Every `render_block` call is one tick: queued messages are applied, every
/// voice gets one `update`, releases requested during the update pass are
/// applied, then active voices are rendered and mixed.
pub struct Synth<R = VecDeque<SynthMessage>> {
    voices: Vec<Box<dyn Voice>>,
    rx: R,
    clock: FrameClock,
    chokes: Vec<Choke>,
    pending: Vec<usize>,
    scratch: Vec<f32>,
}

impl Synth {
    /// A synth fed through [`Synth::queue`].
    pub fn new(sample_rate: f32) -> Self {
        Self::with_receiver(sample_rate, VecDeque::new())
    }

    pub fn queue(&mut self, message: SynthMessage) {
        self.rx.push_back(message);
    }
}

impl<R: MessageReceiver> Synth<R> {
    pub fn with_receiver(sample_rate: f32, rx: R) -> Self {
        Self {
            voices: Vec::new(),
            rx,
            clock: FrameClock::new(sample_rate),
            chokes: Vec::new(),
            pending: Vec::new(),
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Add a voice and return its index.
    pub fn add_voice(&mut self, voice: Box<dyn Voice>) -> usize {
        self.voices.push(voice);
        self.pending.reserve(1);
        self.voices.len() - 1
    }

    pub fn add_choke(&mut self, trigger: usize, target: usize) {
        let choke = Choke { trigger, target };
        if trigger != target && !self.chokes.contains(&choke) {
            self.chokes.push(choke);
        }
    }

    pub fn chokes(&self) -> &[Choke] {
        &self.chokes
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn voice(&self, id: usize) -> Option<&dyn Voice> {
        self.voices.get(id).map(|v| v.as_ref())
    }

    pub fn voice_mut(&mut self, id: usize) -> Option<&mut (dyn Voice + 'static)> {
        self.voices.get_mut(id).map(|v| v.as_mut())
    }

    /// Seconds rendered so far.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn sample_rate(&self) -> f32 {
        self.clock.sample_rate()
    }

    fn ctx(&self) -> RenderCtx {
        RenderCtx::new(self.clock.sample_rate(), self.clock.now())
    }

    /// Press voice `id`, releasing any voices it chokes first.
    pub fn press(&mut self, id: usize, note: u8, velocity: f32) -> bool {
        if id >= self.voices.len() {
            return false;
        }

        for choke in &self.chokes {
            if choke.trigger == id {
                if let Some(target) = self.voices.get_mut(choke.target) {
                    target.release();
                }
            }
        }

        let ctx = self.ctx();
        self.voices[id].press(note, velocity, &ctx)
    }

    pub fn release(&mut self, id: usize) -> bool {
        self.voices.get_mut(id).is_some_and(|v| v.release())
    }

    pub fn release_all(&mut self) {
        for voice in &mut self.voices {
            if voice.is_pressed() {
                voice.release();
            }
        }
    }

    /// Indices of voices still producing sound.
    pub fn live_voices(&self) -> impl Iterator<Item = usize> + '_ {
        self.voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_active())
            .map(|(i, _)| i)
    }

    /// Send a parameter change to every voice. Voices without the
    /// parameter ignore it.
    pub fn apply_all(&mut self, param: VoiceParam) {
        for voice in &mut self.voices {
            voice.apply(param);
        }
    }

    fn handle_message(&mut self, message: SynthMessage) {
        match message {
            SynthMessage::NoteOn {
                voice,
                note,
                velocity,
            } => {
                self.press(voice, note, velocity);
            }
            SynthMessage::NoteOff { voice } => {
                self.release(voice);
            }
            SynthMessage::PitchBend { value } => self.apply_all(VoiceParam::Bend(value)),
            SynthMessage::Param(param) => self.apply_all(param),
            SynthMessage::AllNotesOff => self.release_all(),
        }
    }

    /// Give every voice its per-tick update, then apply the releases they
    /// asked for.
    fn update_voices(&mut self, ctx: &RenderCtx) {
        for (i, voice) in self.voices.iter_mut().enumerate() {
            let mut host = ReleaseQueue {
                pending: &mut self.pending,
                voice: i,
            };
            voice.update(&mut host, ctx);
        }

        for id in self.pending.drain(..) {
            if let Some(voice) = self.voices.get_mut(id) {
                voice.release();
            }
        }
    }

    /// Render stereo output. Blocks longer than `MAX_BLOCK_SIZE` are split
    /// into several ticks.
    pub fn render_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        let frames = left.len().min(right.len());
        let mut offset = 0;
        while offset < frames {
            let end = (offset + MAX_BLOCK_SIZE).min(frames);
            self.tick(&mut left[offset..end], &mut right[offset..end]);
            offset = end;
        }
    }

    fn tick(&mut self, left: &mut [f32], right: &mut [f32]) {
        while let Some(message) = self.rx.pop() {
            self.handle_message(message);
        }

        let ctx = self.ctx();
        self.update_voices(&ctx);

        left.fill(0.0);
        right.fill(0.0);

        let scratch = &mut self.scratch[..left.len()];
        for voice in &mut self.voices {
            if !voice.is_active() {
                continue;
            }
            voice.render_block(scratch, &ctx);

            // Constant-power pan: -1 → left only, 0 → -3 dB each side.
            let angle = (voice.pan() + 1.0) * FRAC_PI_4;
            let (gain_r, gain_l) = angle.sin_cos();
            for ((l, r), s) in left.iter_mut().zip(right.iter_mut()).zip(scratch.iter()) {
                *l += s * gain_l;
                *r += s * gain_r;
            }
        }

        self.clock.advance(left.len());
    }
}
