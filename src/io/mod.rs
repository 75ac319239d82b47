// Purpose - getting waveforms from disk into sample voices

use std::path::Path;

use crate::VoiceError;

pub mod wav;

pub use wav::SymphoniaLoader;

/// Reads an audio file into a mono buffer.
pub trait WaveformLoader: Send + Sync {
    /// Returns at most `max_samples` mono samples and the file's sample rate.
    fn load_from_file(&self, path: &Path, max_samples: usize)
        -> Result<(Vec<f32>, u32), VoiceError>;
}
