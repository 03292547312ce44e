//! Pitch glide (portamento)
//!
//! A one-pole smoother run every audio sample so note changes slide
//! instead of stepping.

/// Fraction of the remaining distance covered per sample
pub const GLIDE_RATE: f64 = 0.005;

/// Smooths a voice's pitch toward its target
#[derive(Debug, Clone)]
pub struct PitchGlide {
    current: f64,
}

impl PitchGlide {
    pub fn new(initial: f64) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    /// Advance one sample toward `target` and return the new pitch
    #[inline]
    pub fn process(&mut self, target: f64) -> f64 {
        self.current += (target - self.current) * GLIDE_RATE;
        self.current
    }
}
