//! Root-frequency estimation for recorded waveforms.
//!
//! A sample voice needs the fundamental of its buffer to tune it. When a
//! caller does not supply one, the voice asks a [`RootEstimator`]. The
//! estimator is pure: same buffer, same answer.

use std::f32::consts::PI;

use rustfft::{num_complex::Complex, FftPlanner};

/// Buffers quieter than this are treated as silence.
pub const SILENCE_THRESHOLD: f32 = 1e-4;
/// Lowest frequency considered a plausible root.
pub const MIN_ROOT_HZ: f32 = 20.0;

const MAX_FFT_SIZE: usize = 1 << 16;

/// Finds the fundamental frequency of a mono buffer.
pub trait RootEstimator: Send {
    /// `None` when the buffer carries no usable pitch.
    fn estimate(&self, data: &[f32], sample_rate: u32) -> Option<f32>;
}

/// Picks the strongest spectral peak between 20 Hz and Nyquist.
///
/// The buffer is Hann-windowed, zero-padded to a power of two and
/// transformed; the peak bin is refined with parabolic interpolation over
/// its neighbours. Good enough for single-note recordings. Sounds whose
/// strongest partial is not the fundamental will report that partial.
#[derive(Debug, Default, Clone, Copy)]
pub struct FftRootEstimator;

impl FftRootEstimator {
    pub fn new() -> Self {
        Self
    }
}

impl RootEstimator for FftRootEstimator {
    fn estimate(&self, data: &[f32], sample_rate: u32) -> Option<f32> {
        if data.len() < 2 || sample_rate == 0 {
            return None;
        }

        let peak = data.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        if peak < SILENCE_THRESHOLD {
            return None;
        }

        let len = data.len().min(MAX_FFT_SIZE);
        let fft_size = len.next_power_of_two();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        let denom = (len - 1) as f32;
        let mut spectrum: Vec<Complex<f32>> = data[..len]
            .iter()
            .enumerate()
            .map(|(i, &sample)| {
                let window = 0.5 * (1.0 - (2.0 * PI * i as f32 / denom).cos());
                Complex::new(sample * window, 0.0)
            })
            .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
            .take(fft_size)
            .collect();

        fft.process(&mut spectrum);

        let rate = sample_rate as f32;
        let bin_hz = rate / fft_size as f32;
        let half = fft_size / 2;
        let first = ((MIN_ROOT_HZ / bin_hz).ceil() as usize).max(1);
        if first + 1 >= half {
            return None;
        }

        let magnitudes: Vec<f32> = spectrum[..half].iter().map(|c| c.norm()).collect();
        let (bin, &magnitude) = magnitudes[first..half - 1]
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, m)| (i + first, m))?;

        if magnitude <= 0.0 {
            return None;
        }

        // Parabolic interpolation across the peak and its neighbours.
        let left = magnitudes[bin - 1];
        let right = magnitudes[bin + 1];
        let curvature = left - 2.0 * magnitude + right;
        let offset = if curvature.abs() > f32::EPSILON {
            (0.5 * (left - right) / curvature).clamp(-0.5, 0.5)
        } else {
            0.0
        };

        let frequency = (bin as f32 + offset) * bin_hz;
        (frequency.is_finite() && frequency > 0.0).then_some(frequency)
    }
}
