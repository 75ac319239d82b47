/// Context passed to voices on every press, update and render call.
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - time: Monotonic time in seconds since the owning synth started.
///   Never runs backward; voices use it to arm and check deadlines.
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub time: f64,
}

impl RenderCtx {
    pub fn new(sample_rate: f32, time: f64) -> Self {
        Self { sample_rate, time }
    }

    /// Same sample rate, different instant.
    pub fn at(&self, time: f64) -> Self {
        Self { time, ..*self }
    }

    /// Seconds covered by `frames` samples at this context's rate.
    #[inline]
    pub fn frames_to_seconds(&self, frames: usize) -> f32 {
        frames as f32 / self.sample_rate
    }
}
