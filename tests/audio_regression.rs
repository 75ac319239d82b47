use voicekit::{
    io::SymphoniaLoader,
    patch::KitPatch,
    synth::{Synth, SynthMessage},
    voice::{
        drum::{kick, snare},
        hat::{closed_hat, open_hat},
        Voice,
    },
    RenderCtx,
};

const SAMPLE_RATE: f32 = 48_000.0;

/// Render `seconds` of a freshly pressed voice in 256-frame blocks.
fn render_voice(mut voice: impl Voice, note: u8, seconds: f32) -> Vec<f32> {
    let frames = (seconds * SAMPLE_RATE) as usize;
    let mut out = vec![0.0; frames];
    assert!(voice.press(note, 1.0, &RenderCtx::new(SAMPLE_RATE, 0.0)));

    for (i, block) in out.chunks_mut(256).enumerate() {
        let ctx = RenderCtx::new(SAMPLE_RATE, (i * 256) as f64 / SAMPLE_RATE as f64);
        voice.render_block(block, &ctx);
    }
    out
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
}

fn rms(samples: &[f32]) -> f32 {
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

#[test]
fn drums_are_audible_bounded_and_decay() {
    for (name, out) in [
        ("kick", render_voice(kick(), 36, 1.0)),
        ("snare", render_voice(snare(), 38, 1.0)),
        ("closed hat", render_voice(closed_hat(), 42, 1.0)),
        ("open hat", render_voice(open_hat(), 46, 2.0)),
    ] {
        assert!(out.iter().all(|s| s.is_finite()), "{name} produced NaN/inf");

        let head = &out[..2_400];
        let tail = &out[out.len() - 2_400..];
        assert!(peak(head) > 0.01, "{name} is silent after the hit");
        assert!(peak(&out) < 4.0, "{name} peak {} is unreasonably loud", peak(&out));
        assert!(peak(tail) < 1e-3, "{name} did not decay: tail peak {}", peak(tail));
    }
}

#[test]
fn open_hat_rings_longer_than_closed_hat() {
    let closed = render_voice(closed_hat(), 42, 0.5);
    let open = render_voice(open_hat(), 46, 0.5);

    let window = 9_600..14_400; // 200..300 ms
    assert!(rms(&open[window.clone()]) > rms(&closed[window]));
}

#[test]
fn kick_is_darker_than_snare() {
    // Zero crossings per second as a crude brightness measure.
    fn crossings(samples: &[f32]) -> usize {
        samples
            .windows(2)
            .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
            .count()
    }

    let kick = render_voice(kick(), 36, 0.05);
    let snare = render_voice(snare(), 38, 0.05);
    assert!(crossings(&kick) < crossings(&snare));
}

#[test]
fn default_kit_renders_through_the_synth() {
    let mut synth = Synth::new(SAMPLE_RATE);
    let ids = KitPatch::default()
        .install(&mut synth, &SymphoniaLoader::new())
        .expect("default kit needs no files");
    assert_eq!(ids.len(), 4);

    for (&id, note) in ids.iter().zip([36u8, 38, 42, 46]) {
        synth.queue(SynthMessage::NoteOn {
            voice: id,
            note,
            velocity: 1.0,
        });
    }

    let mut left = vec![0.0; 4_800];
    let mut right = vec![0.0; 4_800];
    synth.render_block(&mut left, &mut right);

    assert!(peak(&left) > 0.01);
    assert!(peak(&right) > 0.01);
    assert!(left.iter().chain(&right).all(|s| s.is_finite()));

    // The open hat (3) chokes the closed hat (2).
    assert!(synth.voice(ids[2]).is_some_and(|v| !v.is_pressed()));
    assert!(synth.voice(ids[3]).is_some_and(|v| v.is_pressed()));
}

#[test]
fn all_notes_off_lets_the_kit_fall_silent() {
    let mut synth = Synth::new(SAMPLE_RATE);
    let ids = KitPatch::default()
        .install(&mut synth, &SymphoniaLoader::new())
        .expect("default kit needs no files");
    for &id in &ids {
        synth.press(id, 60, 1.0);
    }
    synth.queue(SynthMessage::AllNotesOff);

    let mut left = vec![0.0; 96_000];
    let mut right = vec![0.0; 96_000];
    synth.render_block(&mut left, &mut right);

    assert!(ids.iter().all(|&id| synth.voice(id).is_some_and(|v| !v.is_pressed())));
    assert_eq!(synth.live_voices().count(), 0);
}
