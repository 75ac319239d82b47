/// Monotonic render clock.
///
/// Time is derived from the number of frames rendered so far, so it can only
/// move forward and never drifts from the audio actually produced.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    sample_rate: f32,
    frames: u64,
}

impl FrameClock {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            frames: 0,
        }
    }

    pub fn advance(&mut self, frames: usize) {
        self.frames = self.frames.saturating_add(frames as u64);
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Seconds since the clock started.
    pub fn now(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}
