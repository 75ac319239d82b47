use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::render::RenderCtx;

/*
| type              | constructed by       | passes          | rejects      |
| ----------------- | -------------------- | --------------- | ------------ |
| low-pass          | LPF                  | below cutoff    | above cutoff |
| high-pass         | HPF                  | above cutoff    | below cutoff |
| band-pass         | LPF ∘ HPF (series)   | between cutoffs | outside      |
| notch / band-stop | LPF + HPF (parallel) | outside         | between      |

Drums shape their partial mix with one shared filter: kicks and snares sit
under a low-pass, hats above a high-pass. Sample voices expose the filter as a
tunable parameter.
*/

/// Lowest cutoff the filter accepts.
pub const MIN_CUTOFF_HZ: f32 = 20.0;
/// Highest cutoff the filter accepts, before the Nyquist limit.
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

/// Filter configuration shared by every partial of a voice.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSettings {
    pub filter_type: FilterType,
    pub frequency: f32,
    pub resonance: f32,
}

impl FilterSettings {
    pub fn lowpass(frequency: f32) -> Self {
        Self {
            filter_type: FilterType::LowPass,
            frequency,
            resonance: 0.0,
        }
    }

    pub fn highpass(frequency: f32) -> Self {
        Self {
            filter_type: FilterType::HighPass,
            frequency,
            resonance: 0.0,
        }
    }

    /// Wide-open low-pass: effectively transparent.
    pub fn open() -> Self {
        Self::lowpass(MAX_CUTOFF_HZ)
    }
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self::open()
    }
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
    pub notch: f32,
}

pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    pub cutoff_hz: f32,
    pub resonance: f32,
    filter_type: FilterType,
}

impl SVFilter {
    pub fn new(filter_type: FilterType) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz: 1000.0,
            resonance: 0.0,
            filter_type,
        }
    }

    pub fn from_settings(settings: FilterSettings) -> Self {
        let mut filter = Self::new(settings.filter_type);
        filter.apply(settings);
        filter
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::from_settings(FilterSettings::lowpass(cutoff_hz))
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self::from_settings(FilterSettings::highpass(cutoff_hz))
    }

    pub fn apply(&mut self, settings: FilterSettings) {
        self.filter_type = settings.filter_type;
        self.set_cutoff(settings.frequency);
        self.set_resonance(settings.resonance);
    }

    pub fn settings(&self) -> FilterSettings {
        FilterSettings {
            filter_type: self.filter_type,
            frequency: self.cutoff_hz,
            resonance: self.resonance,
        }
    }

    #[inline]
    fn compute_g(&self, ctx: &RenderCtx) -> f32 {
        // Keep the prewarped frequency below Nyquist or tan() blows up.
        let cutoff = self.cutoff_hz.min(ctx.sample_rate * 0.49);
        let wd = TAU * cutoff;
        let wa = (2.0 * ctx.sample_rate) * (wd / (2.0 * ctx.sample_rate)).tan();
        wa / (2.0 * ctx.sample_rate)
    }

    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - k * v1 - v2,
            notch: sample - k * v1,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let g = self.compute_g(ctx);
        let k = 2.0 - (2.0 * self.resonance);

        for sample in buffer.iter_mut() {
            let outputs = self.next_sample(*sample, k, g);

            *sample = match self.filter_type {
                FilterType::LowPass => outputs.lowpass,
                FilterType::HighPass => outputs.highpass,
                FilterType::BandPass => outputs.bandpass,
                FilterType::Notch => outputs.notch,
            }
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = cutoff.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ);
    }

    /// Resonance in 0.0..1.0; 1.0 would be self-oscillation, so it stops short.
    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = resonance.clamp(0.0, 0.99);
    }

    pub fn set_type(&mut self, filter_type: FilterType) {
        self.filter_type = filter_type;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(buffer: &mut [f32], frequency: f32, sample_rate: f32) {
        for (i, sample) in buffer.iter_mut().enumerate() {
            *sample = (TAU * frequency * i as f32 / sample_rate).sin();
        }
    }

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len().min(32);
        buffer
            .get(skip..)
            .unwrap_or(buffer)
            .iter()
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn test_lowpass_basic() {
        let mut filter = SVFilter::lowpass(500.0);
        let mut buffer = vec![1.0; 128];
        let ctx = RenderCtx::new(48_000.0, 0.0);

        filter.render(&mut buffer, &ctx);

        assert!(buffer[127] > 0.99);
    }

    #[test]
    fn test_highpass_basic() {
        let mut filter = SVFilter::highpass(500.0);
        let mut buffer = vec![1.0; 128];
        let ctx = RenderCtx::new(48_000.0, 0.0);

        filter.render(&mut buffer, &ctx);

        assert!(buffer[127] < 0.001);
    }

    #[test]
    fn test_lowpass_filters_high_freq() {
        let mut filter = SVFilter::lowpass(500.0);
        let sample_rate = 48_000.0;
        let ctx = RenderCtx::new(sample_rate, 0.0);

        let mut buffer = vec![0.0f32; 128];
        sine(&mut buffer, 5_000.0, sample_rate); // 10x cutoff

        filter.render(&mut buffer, &ctx);

        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        assert!(
            peak < 0.3,
            "Expected high freq attenuation, got peak: {}",
            peak
        );
    }

    #[test]
    fn test_highpass_rejects_kick_range() {
        // Hats sit above 9.5 kHz; a 100 Hz body must not leak through.
        let sample_rate = 48_000.0;
        let ctx = RenderCtx::new(sample_rate, 0.0);
        let mut filter = SVFilter::highpass(9_500.0);

        let mut buffer = vec![0.0f32; 1024];
        sine(&mut buffer, 100.0, sample_rate);
        filter.render(&mut buffer, &ctx);

        assert!(peak_after_transient(&buffer) < 0.05);
    }

    #[test]
    fn test_bandpass_emphasizes_cutoff_frequency() {
        let sample_rate = 48_000.0;
        let cutoff = 1_000.0;
        let ctx = RenderCtx::new(sample_rate, 0.0);

        let mut filter = SVFilter::new(FilterType::BandPass);
        filter.set_cutoff(cutoff);
        filter.set_resonance(0.5);

        let mut pass_buffer = vec![0.0f32; 512];
        sine(&mut pass_buffer, cutoff, sample_rate);
        filter.render(&mut pass_buffer, &ctx);
        let pass_peak = peak_after_transient(&pass_buffer);

        filter.reset();
        let mut off_buffer = vec![0.0f32; 512];
        sine(&mut off_buffer, 200.0, sample_rate);
        filter.render(&mut off_buffer, &ctx);
        let off_peak = peak_after_transient(&off_buffer);

        assert!(
            pass_peak > off_peak * 2.0,
            "expected bandpass to emphasize cutoff freq, got pass_peak={}, off_peak={}",
            pass_peak,
            off_peak
        );
    }

    #[test]
    fn test_settings_roundtrip_through_apply() {
        let mut filter = SVFilter::lowpass(1000.0);
        let settings = FilterSettings {
            filter_type: FilterType::HighPass,
            frequency: 9_500.0,
            resonance: 0.25,
        };

        filter.apply(settings);

        assert_eq!(filter.settings(), settings);
    }

    #[test]
    fn test_cutoff_and_resonance_are_clamped() {
        let mut filter = SVFilter::lowpass(1000.0);

        filter.set_cutoff(0.0);
        assert_eq!(filter.cutoff_hz, MIN_CUTOFF_HZ);
        filter.set_cutoff(1_000_000.0);
        assert_eq!(filter.cutoff_hz, MAX_CUTOFF_HZ);

        filter.set_resonance(5.0);
        assert!(filter.resonance < 1.0);
    }

    #[test]
    fn test_open_filter_survives_low_sample_rate() {
        // 20 kHz cutoff at 22.05 kHz is above Nyquist; output must stay finite.
        let mut filter = SVFilter::from_settings(FilterSettings::open());
        let ctx = RenderCtx::new(22_050.0, 0.0);
        let mut buffer = vec![0.0f32; 256];
        sine(&mut buffer, 440.0, 22_050.0);

        filter.render(&mut buffer, &ctx);

        assert!(buffer.iter().all(|s| s.is_finite()));
    }
}
