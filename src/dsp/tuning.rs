//! Octave-based tuning math shared by every voice.

/*
Tuning in Octaves
=================

Every pitch correction in this crate is expressed in OCTAVES and applied as a
power of two. Working in octaves turns multiplication of frequency ratios into
addition of offsets, which is how independent corrections stack.

Vocabulary
----------

  ratio       A frequency multiplier. 2.0 is one octave up, 0.5 one down.

  octaves     log2(ratio). +1.0 is one octave up, -1.0 one down,
              1/12 is one equal-tempered semitone.

  root        The fundamental frequency of a recorded waveform: the pitch
              you hear when the buffer plays back at its native rate.

  desired     The frequency a sample voice is tuned to at rest.


Sample Tune
-----------

A wavetable player reads the whole buffer once per cycle of the note
frequency. A recording holds many cycles of its fundamental, so playing it
"at 440 Hz" would be far too fast. The correction is the ratio between one
period of the fundamental and the duration of the whole buffer:

    wave_duration   = 1 / root
    sample_duration = len / sample_rate
    sample_tune     = log2(wave_duration / sample_duration)

Example: 22050 samples at 22050 Hz with a 220 Hz fundamental
  - wave_duration   = 1/220 s
  - sample_duration = 1 s
  - sample_tune     = log2(1/220) ≈ -7.78 octaves

With that correction a note at 220 Hz replays the buffer at exactly its
native rate.


Loop Tune
---------

Looping a sub-range means each cycle reads fewer samples, so the cycle has to
run slower to keep the fundamental in place:

    loop_tune = log2(buffer_len / loop_len)

    full buffer  →  0.0
    half buffer  →  1.0
    quarter      →  2.0

Loops shorter than two samples carry no pitch information; they resolve to
0.0 instead of dividing by (almost) zero.


Combining
---------

    frequency = base × 2^sample_tune × 2^loop_tune
*/

/// MIDI note number of A4.
pub const A4_NOTE: u8 = 69;
/// Concert pitch.
pub const A4_FREQUENCY: f32 = 440.0;

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    A4_FREQUENCY * octaves_to_ratio((note as f32 - A4_NOTE as f32) / 12.0)
}

/// `2^octaves`.
#[inline]
pub fn octaves_to_ratio(octaves: f32) -> f32 {
    2.0_f32.powf(octaves)
}

/// `log2(ratio)`, or 0.0 for ratios that have no logarithm.
#[inline]
pub fn ratio_to_octaves(ratio: f32) -> f32 {
    if ratio > 0.0 && ratio.is_finite() {
        ratio.log2()
    } else {
        0.0
    }
}

#[inline]
pub fn semitones_to_octaves(semitones: f32) -> f32 {
    semitones / 12.0
}

/// Correction that makes one buffer pass last one period of `root`.
///
/// Returns 0.0 when the buffer is empty, the rate is zero or the root is not
/// a positive frequency.
pub fn sample_tune(root: f32, sample_len: usize, sample_rate: u32) -> f32 {
    if sample_len == 0 || sample_rate == 0 || root <= 0.0 || !root.is_finite() {
        return 0.0;
    }
    let wave_duration = 1.0 / root;
    let sample_duration = sample_len as f32 / sample_rate as f32;
    ratio_to_octaves(wave_duration / sample_duration)
}

/// Correction for looping `loop_len` samples out of `buffer_len`.
pub fn loop_tune(buffer_len: usize, loop_len: usize) -> f32 {
    if loop_len < 2 || buffer_len == 0 {
        return 0.0;
    }
    ratio_to_octaves(buffer_len as f32 / loop_len as f32)
}

/// Linearly map a 0..1 control value onto `[min, max]`.
#[inline]
pub fn map_value(value: f32, min: f32, max: f32) -> f32 {
    min + (max - min) * value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midi_note_to_freq() {
        assert!((midi_note_to_freq(69) - 440.0).abs() < 1e-3);
        assert!((midi_note_to_freq(57) - 220.0).abs() < 1e-3);
        assert!((midi_note_to_freq(60) - 261.6256).abs() < 1e-2);
    }

    #[test]
    fn test_octave_roundtrip() {
        for &octaves in &[-2.0, -0.5, 0.0, 1.0 / 12.0, 3.0] {
            let back = ratio_to_octaves(octaves_to_ratio(octaves));
            assert!((back - octaves).abs() < 1e-5, "{octaves} came back as {back}");
        }
    }

    #[test]
    fn test_ratio_to_octaves_guards_non_positive() {
        assert_eq!(ratio_to_octaves(0.0), 0.0);
        assert_eq!(ratio_to_octaves(-2.0), 0.0);
        assert_eq!(ratio_to_octaves(f32::INFINITY), 0.0);
        assert_eq!(ratio_to_octaves(f32::NAN), 0.0);
    }

    #[test]
    fn test_sample_tune_native_rate() {
        // One second of a 1 Hz fundamental: one buffer pass is one period.
        assert!(sample_tune(1.0, 1000, 1000).abs() < 1e-6);

        // 220 Hz fundamental in a one-second buffer.
        let tune = sample_tune(220.0, 22050, 22050);
        assert!((tune - (1.0f32 / 220.0).log2()).abs() < 1e-5);
    }

    #[test]
    fn test_sample_tune_degenerate_inputs() {
        assert_eq!(sample_tune(440.0, 0, 22050), 0.0);
        assert_eq!(sample_tune(440.0, 100, 0), 0.0);
        assert_eq!(sample_tune(0.0, 100, 22050), 0.0);
        assert_eq!(sample_tune(f32::NAN, 100, 22050), 0.0);
    }

    #[test]
    fn test_loop_tune_boundaries() {
        assert_eq!(loop_tune(2000, 2000), 0.0);
        assert_eq!(loop_tune(2000, 1000), 1.0);
        assert_eq!(loop_tune(2000, 500), 2.0);
        assert_eq!(loop_tune(2000, 1), 0.0);
        assert_eq!(loop_tune(2000, 0), 0.0);
    }

    #[test]
    fn test_map_value() {
        assert_eq!(map_value(0.0, 0.25, 1.0), 0.25);
        assert_eq!(map_value(1.0, 0.25, 1.0), 1.0);
        assert!((map_value(0.5, 0.0, 0.2) - 0.1).abs() < 1e-6);
        assert_eq!(map_value(2.0, 0.0, 1.0), 1.0);
    }
}
