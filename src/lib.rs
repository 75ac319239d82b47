pub mod dsp;
pub mod error;
pub mod io;
pub mod patch; // Kit and voice descriptors
pub mod render;
pub mod synth; // Mixer, clock and message handling
pub mod voice; // Drum, hat, oscillator and sample voices

pub use error::VoiceError;
pub use render::RenderCtx;

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
