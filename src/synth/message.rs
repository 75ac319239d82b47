use std::collections::VecDeque;

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::voice::VoiceParam;

/// Control events for a [`Synth`](super::Synth), addressed by voice index.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn { voice: usize, note: u8, velocity: f32 },
    NoteOff { voice: usize },
    /// Pitch wheel, -1.0..=1.0, sent to every voice.
    PitchBend { value: f32 },
    /// Parameter change sent to every voice.
    Param(VoiceParam),
    AllNotesOff,
}

pub trait MessageReceiver: Send {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

/// Single-threaded queue, for tests and offline rendering.
impl MessageReceiver for VecDeque<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.pop_front()
    }
}
