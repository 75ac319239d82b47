//! Step pattern playback
//!
//! Runs on its own thread and feeds the audio thread through the ring buffer.

use std::thread;
use std::time::{Duration, Instant};

use rtrb::Producer;
use tracing::warn;
use voicekit::synth::SynthMessage;

pub const STEPS: usize = 16;

/// One lane per voice; `Some(velocity)` hits on that step.
pub struct StepPattern {
    lanes: Vec<(usize, u8, [Option<f32>; STEPS])>,
}

impl StepPattern {
    /// Kick on the beat, snare on 2 and 4, eighth-note hats with an open hat
    /// on the last off-beat. Voices beyond the fourth stay silent.
    pub fn four_on_the_floor(voices: &[usize]) -> Self {
        let mut kick = [None; STEPS];
        let mut snare = [None; STEPS];
        let mut closed = [None; STEPS];
        let mut open = [None; STEPS];

        for step in (0..STEPS).step_by(4) {
            kick[step] = Some(1.0);
        }
        snare[4] = Some(0.9);
        snare[12] = Some(0.9);
        for step in (0..STEPS).step_by(2) {
            closed[step] = Some(if step % 4 == 0 { 0.8 } else { 0.5 });
        }
        closed[14] = None;
        open[14] = Some(0.7);

        let lanes = [(36, kick), (38, snare), (42, closed), (46, open)]
            .into_iter()
            .zip(voices)
            .map(|((note, steps), &voice)| (voice, note, steps))
            .collect();

        Self { lanes }
    }

    /// Loop the pattern forever at `bpm`, four steps per beat.
    pub fn play(self, mut tx: Producer<SynthMessage>, bpm: f64) {
        let step_len = Duration::from_secs_f64(60.0 / bpm / 4.0);
        let mut next = Instant::now();

        for step in (0..STEPS).cycle() {
            for &(voice, note, steps) in &self.lanes {
                let Some(velocity) = steps[step] else {
                    continue;
                };
                // A voice ignores a press of the note it is already holding.
                send(&mut tx, SynthMessage::NoteOff { voice });
                send(
                    &mut tx,
                    SynthMessage::NoteOn {
                        voice,
                        note,
                        velocity,
                    },
                );
            }

            next += step_len;
            thread::sleep(next.saturating_duration_since(Instant::now()));
        }
    }
}

fn send(tx: &mut Producer<SynthMessage>, message: SynthMessage) {
    if tx.push(message).is_err() {
        warn!(?message, "Message queue full, dropping");
    }
}
