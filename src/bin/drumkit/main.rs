//! drumkit - plays a kit through the default output device
//!
//! Run with: cargo run --bin drumkit -- [kit.toml] [bpm]

mod audio;
mod pattern;

use std::{env, fs, thread};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use tracing::info;
use tracing_subscriber::EnvFilter;
use voicekit::{io::SymphoniaLoader, patch::KitPatch, synth::SynthMessage};

use pattern::StepPattern;

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = env::args().skip(1);
    let kit = match args.next() {
        Some(path) => {
            let source = fs::read_to_string(&path)
                .wrap_err_with(|| format!("failed to read kit file {path}"))?;
            KitPatch::from_toml_str(&source)
                .wrap_err_with(|| format!("failed to parse kit file {path}"))?
        }
        None => KitPatch::default(),
    };
    let bpm = match args.next() {
        Some(raw) => raw
            .parse::<f64>()
            .map_err(|e| eyre!("invalid bpm {raw:?}: {e}"))?,
        None => 120.0,
    };

    let (tx, rx) = rtrb::RingBuffer::<SynthMessage>::new(256);
    let output = audio::start(&kit, &SymphoniaLoader::new(), rx)?;

    info!(
        kit = %kit.name,
        voices = output.voices.len(),
        sample_rate = output.sample_rate,
        bpm,
        "Playing, press Ctrl+C to stop"
    );

    let pattern = StepPattern::four_on_the_floor(&output.voices);
    let player = thread::spawn(move || pattern.play(tx, bpm));

    player
        .join()
        .map_err(|_| eyre!("pattern thread panicked"))?;
    drop(output);
    Ok(())
}
