use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};
use tracing::debug;

use super::WaveformLoader;
use crate::VoiceError;

/// Decodes any format symphonia supports (WAV, FLAC, Ogg/Vorbis, ...).
///
/// Channels are averaged down to mono and decoding stops as soon as
/// `max_samples` frames have been read.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaLoader;

impl SymphoniaLoader {
    pub fn new() -> Self {
        Self
    }

    /// Next packet, or `None` at end of stream.
    fn read_next_packet(
        format_reader: &mut dyn FormatReader,
    ) -> Result<Option<Packet>, SymphoniaError> {
        match format_reader.next_packet() {
            Ok(packet) => Ok(Some(packet)),
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl WaveformLoader for SymphoniaLoader {
    fn load_from_file(
        &self,
        path: &Path,
        max_samples: usize,
    ) -> Result<(Vec<f32>, u32), VoiceError> {
        let file_path = path.to_string_lossy().to_string();
        let file = File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        let meta_opts: MetadataOptions = Default::default();
        let fmt_opts: FormatOptions = Default::default();
        let probed = get_probe().format(&hint, mss, &fmt_opts, &meta_opts)?;
        let mut format_reader = probed.format;

        let track = format_reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| VoiceError::NoAudioTrack(file_path.clone()))?;

        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| VoiceError::UnknownSampleRate(file_path.clone()))?;

        let decoder_opts: DecoderOptions = Default::default();
        let mut decoder = get_codecs().make(&track.codec_params, &decoder_opts)?;

        let mut mono = Vec::with_capacity(max_samples.min(1 << 20));
        let mut sample_buf: Option<SampleBuffer<f32>> = None;

        while mono.len() < max_samples {
            let Some(packet) = Self::read_next_packet(format_reader.as_mut())? else {
                break;
            };
            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                // A corrupt packet is skipped, not fatal.
                Err(SymphoniaError::DecodeError(e)) => {
                    debug!(file = %file_path, error = e, "Skipping undecodable packet");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let spec = *decoded.spec();
            let channels = spec.channels.count().max(1);
            let buf = sample_buf.get_or_insert_with(|| {
                SampleBuffer::new(decoded.capacity() as u64, spec)
            });
            if buf.capacity() < decoded.capacity() * channels {
                *buf = SampleBuffer::new(decoded.capacity() as u64, spec);
            }
            buf.copy_interleaved_ref(decoded);

            let remaining = max_samples - mono.len();
            mono.extend(
                buf.samples()
                    .chunks_exact(channels)
                    .take(remaining)
                    .map(|frame| frame.iter().sum::<f32>() / channels as f32),
            );
        }

        debug!(
            file = %file_path,
            samples = mono.len(),
            sample_rate,
            "Loaded waveform"
        );

        Ok((mono, sample_rate))
    }
}
