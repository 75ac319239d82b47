//! Hi-hat voice.
//!
//! Three noise partials above a 9.5 kHz high-pass. The decay is a single
//! normalized control mapped into the hat's `[min_time, max_time]` range;
//! the middle partial is trimmed 20ms shorter than the outer two.
//!
//! Damping an open hat with the closed one is up to the owner: see
//! `Synth::add_choke`.

use crate::{
    dsp::{
        filter::{FilterSettings, FilterType},
        tuning::map_value,
        waveform,
    },
    render::RenderCtx,
    voice::{drum::Drum, Voice, VoiceHost, VoiceParams},
};

const HAT_TRIM: f32 = 0.02;

pub struct Hat {
    drum: Drum,
    min_time: f32,
    max_time: f32,
}

impl Hat {
    pub fn new(min_time: f32, max_time: f32) -> Self {
        let min_time = min_time.max(0.0);
        let max_time = max_time.max(min_time);

        let drum = Drum::new(
            3,
            FilterSettings::highpass(9_500.0),
            &[90.0, 135.0, 165.0],
            &[],
            &[waveform::noise()],
        );

        let mut hat = Self {
            drum,
            min_time,
            max_time,
        };
        hat.set_time(0.5);
        hat
    }

    /// Set the decay from a 0..1 control value.
    pub fn set_time(&mut self, value: f32) {
        let time = map_value(value, self.min_time, self.max_time);
        self.drum
            .set_times(&[time, (time - HAT_TRIM).max(0.0), time]);
    }

    pub fn time_range(&self) -> (f32, f32) {
        (self.min_time, self.max_time)
    }

    pub fn drum(&self) -> &Drum {
        &self.drum
    }

    pub fn drum_mut(&mut self) -> &mut Drum {
        &mut self.drum
    }
}

impl Voice for Hat {
    fn press(&mut self, note: u8, velocity: f32, ctx: &RenderCtx) -> bool {
        self.drum.press(note, velocity, ctx)
    }

    fn release(&mut self) -> bool {
        self.drum.release()
    }

    fn update(&mut self, host: &mut dyn VoiceHost, ctx: &RenderCtx) {
        self.drum.update(host, ctx);
    }

    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.drum.render_block(out, ctx);
    }

    fn is_pressed(&self) -> bool {
        self.drum.is_pressed()
    }

    fn is_active(&self) -> bool {
        self.drum.is_active()
    }

    fn pan(&self) -> f32 {
        self.drum.pan()
    }
}

impl VoiceParams for Hat {
    fn set_amplitude(&mut self, value: f32) {
        self.drum.set_amplitude(value);
    }

    fn set_pan(&mut self, value: f32) {
        self.drum.set_pan(value);
    }

    fn set_velocity_amount(&mut self, value: f32) {
        self.drum.set_velocity_amount(value);
    }

    fn set_attack_level(&mut self, value: f32) {
        self.drum.set_attack_level(value);
    }

    fn set_decay_time(&mut self, seconds: f32) {
        self.drum.set_decay_time(seconds);
    }

    fn set_filter_type(&mut self, filter_type: FilterType) {
        self.drum.set_filter_type(filter_type);
    }

    fn set_filter_frequency(&mut self, hz: f32) {
        self.drum.set_filter_frequency(hz);
    }

    fn set_filter_resonance(&mut self, value: f32) {
        self.drum.set_filter_resonance(value);
    }
}

pub fn closed_hat() -> Hat {
    Hat::new(0.025, 0.2)
}

pub fn open_hat() -> Hat {
    Hat::new(0.25, 1.0)
}
