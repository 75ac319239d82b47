use std::path::Path;

use tracing::{debug, warn};

use crate::{
    dsp::{
        envelope::EnvelopeParams,
        filter::FilterType,
        pitch::{FftRootEstimator, RootEstimator},
        tuning::{self, octaves_to_ratio, A4_FREQUENCY},
        waveform::Waveform,
    },
    io::WaveformLoader,
    render::RenderCtx,
    voice::{oscillator::OscillatorVoice, Voice, VoiceHost, VoiceParams},
    VoiceError,
};

/*
Sample Voice
============

Plays a recording as the waveform of a single oscillator note, retuned so
that pressing a key sounds that key's pitch.

Tuning
------

The note player reads one loop of the buffer per cycle of the note
frequency. Two corrections (see `dsp::tuning`) turn that into musical pitch:

    sample_tune = log2((1 / root) / (len / rate))
    loop_tune   = log2(buffer_len / loop_len)       (0 when loop_len < 2)

    frequency = note_frequency × 2^sample_tune × 2^loop_tune

Both are recomputed on every `load` and every loop change. The whole tuning
state lives in one `SampleTuning` value that is replaced, never patched, so
it can't end up half-updated.

One-Shot Auto-Stop
------------------

A looping sample plays until released. A one-shot sample arms a deadline when
pressed:

    deadline = press_time + sample_duration × root / 2^bend / desired

`update` compares the render clock against it. When the deadline passes the
voice disarms it and asks the host to release it, exactly once. Changing the
bend or the desired frequency while armed moves the deadline, measured from
the original press.

        press                        deadline
          │◄──────── duration ───────►│
    ──────┴───────────────────────────┴─────→ time
       armed                       released, disarmed
*/

/// Samples read by `load_from_file` unless told otherwise.
pub const DEFAULT_MAX_SAMPLES: usize = 4096;

/// Tuning state derived from the loaded buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleTuning {
    /// Native rate of the loaded buffer.
    pub wave_rate: u32,
    /// Fundamental of the buffer (Hz).
    pub root: f32,
    /// Length of the buffer in seconds at its native rate.
    pub sample_duration: f32,
    /// Octaves.
    pub sample_tune: f32,
    /// Octaves.
    pub loop_tune: f32,
}

impl SampleTuning {
    /// No buffer: native rate, root at the desired frequency, no correction.
    pub fn neutral(output_rate: u32, desired_frequency: f32) -> Self {
        Self {
            wave_rate: output_rate,
            root: desired_frequency,
            sample_duration: 0.0,
            sample_tune: 0.0,
            loop_tune: 0.0,
        }
    }

    /// Frequency multiplier applied to the oscillator.
    pub fn correction(&self) -> f32 {
        octaves_to_ratio(self.sample_tune + self.loop_tune)
    }
}

#[derive(Debug, Clone, Copy)]
struct AutoStop {
    started: f64,
    deadline: f64,
}

pub struct SampleVoice {
    osc: OscillatorVoice,
    estimator: Box<dyn RootEstimator>,
    output_rate: u32,
    looping: bool,
    desired_frequency: f32,
    loop_start: f32,
    loop_end: f32,
    tuning: SampleTuning,
    auto_stop: Option<AutoStop>,
}

impl SampleVoice {
    /// An empty, looping sample voice rendering at `output_rate`.
    pub fn new(output_rate: u32) -> Self {
        Self::with_estimator(output_rate, Box::new(FftRootEstimator::new()))
    }

    pub fn with_estimator(output_rate: u32, estimator: Box<dyn RootEstimator>) -> Self {
        let osc = OscillatorVoice::new(None)
            .with_envelope(EnvelopeParams::adsr(0.0, 0.0, 1.0, 0.05));

        Self {
            osc,
            estimator,
            output_rate,
            looping: true,
            desired_frequency: A4_FREQUENCY,
            loop_start: 0.0,
            loop_end: 1.0,
            tuning: SampleTuning::neutral(output_rate, A4_FREQUENCY),
            auto_stop: None,
        }
    }

    /// Load a mono buffer.
    ///
    /// `root` is the buffer's fundamental if known; otherwise it is
    /// estimated, and if that fails the desired frequency is assumed. An
    /// empty buffer or a zero rate unloads the voice instead.
    pub fn load(&mut self, data: impl Into<Waveform>, sample_rate: u32, root: Option<f32>) {
        let data: Waveform = data.into();
        if data.is_empty() || sample_rate == 0 {
            warn!(
                len = data.len(),
                sample_rate, "Empty sample or unknown rate, unloading"
            );
            self.unload();
            return;
        }

        let root = match root {
            Some(root) if root.is_finite() && root > 0.0 => root,
            supplied => {
                if supplied.is_some() {
                    warn!(root = ?supplied, "Ignoring invalid root frequency");
                }
                match self.estimator.estimate(&data, sample_rate) {
                    Some(estimate) => estimate,
                    None => {
                        warn!(
                            desired = self.desired_frequency,
                            "Could not estimate root frequency, assuming desired frequency"
                        );
                        self.desired_frequency
                    }
                }
            }
        };

        let len = data.len();
        self.osc.set_waveform(Some(data));
        self.tuning = SampleTuning {
            wave_rate: sample_rate,
            root,
            sample_duration: len as f32 / sample_rate as f32,
            sample_tune: tuning::sample_tune(root, len, sample_rate),
            loop_tune: 0.0,
        };

        debug!(
            len,
            sample_rate,
            root,
            sample_tune = self.tuning.sample_tune,
            "Loaded sample"
        );

        self.set_loop(0.0, 1.0);
    }

    /// Decode a file with `loader` and load the first `max_samples` of it.
    pub fn load_from_file(
        &mut self,
        loader: &dyn WaveformLoader,
        path: &Path,
        max_samples: usize,
    ) -> Result<(), VoiceError> {
        let (data, sample_rate) = loader.load_from_file(path, max_samples)?;
        debug!(path = ?path, samples = data.len(), sample_rate, "Decoded sample file");
        self.load(data, sample_rate, None);
        Ok(())
    }

    /// Drop the buffer and return to neutral tuning.
    pub fn unload(&mut self) {
        self.osc.set_waveform(None);
        self.loop_start = 0.0;
        self.loop_end = 1.0;
        self.apply_tuning(SampleTuning::neutral(
            self.output_rate,
            self.desired_frequency,
        ));
    }

    pub fn is_loaded(&self) -> bool {
        self.osc.note().waveform().is_some()
    }

    /// Loop bounds as fractions of the buffer, clamped with `start <= end`.
    pub fn set_loop(&mut self, start: f32, end: f32) {
        self.osc.note_mut().set_loop(start, end);
        self.loop_start = start.clamp(0.0, 1.0);
        self.loop_end = end.clamp(self.loop_start, 1.0);

        let note = self.osc.note();
        let buffer_len = note.waveform().map_or(0, |w| w.len());
        let loop_tune = tuning::loop_tune(buffer_len, note.loop_len());

        self.apply_tuning(SampleTuning {
            loop_tune,
            ..self.tuning
        });
    }

    pub fn loop_range(&self) -> (f32, f32) {
        (self.loop_start, self.loop_end)
    }

    pub fn tuning(&self) -> &SampleTuning {
        &self.tuning
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn desired_frequency(&self) -> f32 {
        self.desired_frequency
    }

    /// The pitch this voice treats as "in tune" (Hz).
    pub fn set_desired_frequency(&mut self, frequency: f32) {
        if !(frequency.is_finite() && frequency > 0.0) {
            return;
        }
        self.desired_frequency = frequency;
        if !self.is_loaded() {
            self.tuning.root = frequency;
        }
        self.rearm();
    }

    /// Seconds a one-shot press plays before releasing itself.
    pub fn get_duration(&self) -> f32 {
        self.tuning.sample_duration * self.tuning.root
            / octaves_to_ratio(self.osc.bend_octaves())
            / self.desired_frequency
    }

    /// Deadline of the armed auto-stop, if any.
    pub fn deadline(&self) -> Option<f64> {
        self.auto_stop.map(|stop| stop.deadline)
    }

    pub fn oscillator(&self) -> &OscillatorVoice {
        &self.osc
    }

    fn apply_tuning(&mut self, tuning: SampleTuning) {
        self.tuning = tuning;
        self.osc.set_correction(tuning.correction());
        self.rearm();
    }

    fn rearm(&mut self) {
        let duration = self.get_duration() as f64;
        if let Some(stop) = self.auto_stop.as_mut() {
            stop.deadline = stop.started + duration;
        }
    }
}

impl Voice for SampleVoice {
    fn press(&mut self, note: u8, velocity: f32, ctx: &RenderCtx) -> bool {
        if !self.is_loaded() {
            return false;
        }
        if !self.osc.press(note, velocity, ctx) {
            return false;
        }
        if !self.looping {
            self.auto_stop = Some(AutoStop {
                started: ctx.time,
                deadline: ctx.time + self.get_duration() as f64,
            });
        }
        true
    }

    fn release(&mut self) -> bool {
        self.auto_stop = None;
        self.osc.release()
    }

    fn update(&mut self, host: &mut dyn VoiceHost, ctx: &RenderCtx) {
        self.osc.update(host, ctx);

        if self.looping {
            return;
        }
        if self.auto_stop.is_some_and(|stop| ctx.time >= stop.deadline) {
            self.auto_stop = None;
            debug!(time = ctx.time, "One-shot sample finished, releasing");
            host.release();
        }
    }

    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.osc.render_block(out, ctx);
    }

    fn is_pressed(&self) -> bool {
        self.osc.is_pressed()
    }

    fn is_active(&self) -> bool {
        self.osc.is_active()
    }

    fn pan(&self) -> f32 {
        self.osc.pan()
    }
}

impl VoiceParams for SampleVoice {
    fn set_amplitude(&mut self, value: f32) {
        self.osc.set_amplitude(value);
    }

    fn set_pan(&mut self, value: f32) {
        self.osc.set_pan(value);
    }

    fn set_coarse_tune(&mut self, octaves: f32) {
        self.osc.set_coarse_tune(octaves);
    }

    fn set_fine_tune(&mut self, octaves: f32) {
        self.osc.set_fine_tune(octaves);
    }

    fn set_bend(&mut self, value: f32) {
        self.osc.set_bend(value);
        self.rearm();
    }

    fn set_bend_amount(&mut self, octaves: f32) {
        self.osc.set_bend_amount(octaves);
        self.rearm();
    }

    fn set_velocity_amount(&mut self, value: f32) {
        self.osc.set_velocity_amount(value);
    }

    fn set_attack_time(&mut self, seconds: f32) {
        self.osc.set_attack_time(seconds);
    }

    fn set_attack_level(&mut self, value: f32) {
        self.osc.set_attack_level(value);
    }

    fn set_decay_time(&mut self, seconds: f32) {
        self.osc.set_decay_time(seconds);
    }

    fn set_sustain_level(&mut self, value: f32) {
        self.osc.set_sustain_level(value);
    }

    fn set_release_time(&mut self, seconds: f32) {
        self.osc.set_release_time(seconds);
    }

    fn set_filter_type(&mut self, filter_type: FilterType) {
        self.osc.set_filter_type(filter_type);
    }

    fn set_filter_frequency(&mut self, hz: f32) {
        self.osc.set_filter_frequency(hz);
    }

    fn set_filter_resonance(&mut self, value: f32) {
        self.osc.set_filter_resonance(value);
    }

    /// Switching to looping disarms any pending auto-stop.
    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
        if looping {
            self.auto_stop = None;
        }
    }
}
