//! Triangle oscillators

use crate::NUM_VOICES;

/// A phase-continuous triangle oscillator
///
/// Frequency is supplied per sample so a gliding pitch never resets
/// the phase.
#[derive(Debug, Clone)]
pub struct Oscillator {
    phase: f64,
    sample_rate: f64,
}

impl Oscillator {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            phase: 0.0,
            sample_rate,
        }
    }

    /// Current phase in [0, 1)
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Generate the next sample at `frequency` Hz
    pub fn generate(&mut self, frequency: f64) -> f64 {
        let sample = triangle(self.phase);

        self.phase += frequency / self.sample_rate;
        if self.phase >= 1.0 || self.phase < 0.0 {
            self.phase -= self.phase.floor();
        }

        sample
    }
}

fn triangle(p: f64) -> f64 {
    if p < 0.25 {
        4.0 * p
    } else if p < 0.75 {
        2.0 - 4.0 * p
    } else {
        4.0 * p - 4.0
    }
}

/// One oscillator per voice
#[derive(Debug, Clone)]
pub struct OscillatorBank {
    oscillators: [Oscillator; NUM_VOICES],
}

impl OscillatorBank {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            oscillators: std::array::from_fn(|_| Oscillator::new(sample_rate)),
        }
    }

    /// Next sample of `voice` at `frequency` Hz
    pub fn generate(&mut self, voice: usize, frequency: f64) -> f64 {
        self.oscillators[voice].generate(frequency)
    }

    pub fn oscillator(&self, voice: usize) -> &Oscillator {
        &self.oscillators[voice]
    }
}
