//! Low-level DSP primitives used by the voices.
//!
//! These components are allocation-free on their render paths and
//! realtime-safe, so they can be embedded directly inside voice structs. They
//! stay focused on the signal math; the `voice` layer decides when notes start,
//! stop and retune.

/// Attack/decay/sustain/release envelope generator with an attack level.
pub mod envelope;
/// State-variable filter implementation with multiple responses.
pub mod filter;
/// Wavetable note player (one partial).
pub mod note;
/// Fundamental-frequency estimation for recorded waveforms.
pub mod pitch;
/// One-shot pitch-sweep modulator shared by drum partials.
pub mod sweep;
/// Octave-based frequency algebra.
pub mod tuning;
/// Single-cycle waveform tables.
pub mod waveform;

pub use envelope::{EnvelopeParams, EnvelopeState};
pub use waveform::Waveform;
