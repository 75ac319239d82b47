/// Errors raised by the fallible edges of the crate: loading waveforms from
/// disk and parsing kit descriptions. Note events never produce errors; they
/// report rejection through their `bool` return value instead.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Audio file error: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    #[error("No audio track found in {0}")]
    NoAudioTrack(String),

    #[error("Sample rate not specified in {0}")]
    UnknownSampleRate(String),

    #[error("Sample voice '{0}' has no path to load from")]
    MissingSamplePath(String),

    #[cfg(feature = "serde")]
    #[error("Kit parse error: {0}")]
    Patch(#[from] toml::de::Error),
}
