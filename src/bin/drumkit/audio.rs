//! Output stream setup

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use rtrb::Consumer;
use tracing::error;

use voicekit::{
    io::WaveformLoader,
    patch::KitPatch,
    synth::{Synth, SynthMessage},
    MAX_BLOCK_SIZE,
};

/// A running output stream. Audio stops when this is dropped.
pub struct Output {
    _stream: cpal::Stream,
    pub voices: Vec<usize>,
    pub sample_rate: f32,
}

pub fn start(
    kit: &KitPatch,
    loader: &dyn WaveformLoader,
    rx: Consumer<SynthMessage>,
) -> EyreResult<Output> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    if config.sample_format() != SampleFormat::F32 {
        return Err(eyre!(
            "unsupported output sample format {:?}, expected f32",
            config.sample_format()
        ));
    }

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    let mut synth = Synth::with_receiver(sample_rate, rx);
    let voices = kit
        .install(&mut synth, loader)
        .wrap_err_with(|| format!("failed to build kit {}", kit.name))?;

    let mut left = vec![0.0f32; MAX_BLOCK_SIZE];
    let mut right = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            for chunk in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
                let frames = chunk.len() / channels;
                let (lbuf, rbuf) = (&mut left[..frames], &mut right[..frames]);
                synth.render_block(lbuf, rbuf);

                let stereo = lbuf.iter().zip(rbuf.iter());
                for (frame, (&l, &r)) in chunk.chunks_exact_mut(channels).zip(stereo) {
                    match frame {
                        [mono] => *mono = 0.5 * (l + r),
                        [fl, fr, rest @ ..] => {
                            *fl = l;
                            *fr = r;
                            rest.fill(0.0);
                        }
                        [] => {}
                    }
                }
            }
        },
        |err| error!(%err, "Audio stream error"),
        None,
    )?;

    stream.play()?;

    Ok(Output {
        _stream: stream,
        voices,
        sample_rate,
    })
}
