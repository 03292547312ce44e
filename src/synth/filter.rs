//! Resonant low-pass filter
//!
//! A two-state resonant low-pass whose cutoff can move every sample.
//! Coefficients are only recomputed when cutoff or resonance change.

use std::f64::consts::PI;

/// Lowest cutoff the filter accepts, in Hz
pub const MIN_CUTOFF: f64 = 10.0;

/// Highest cutoff as a fraction of the sample rate. Above roughly 0.2
/// the recursion stops being stable.
pub const MAX_CUTOFF_RATIO: f64 = 0.18;

/// Resonant low-pass filter
pub struct Filter {
    sample_rate: f64,
    cutoff: f64,
    resonance: f64,

    // Coefficients
    c: f64,
    r: f64,

    // State
    x: f64,
    y: f64,
}

impl Filter {
    /// Create a filter at 1 kHz with minimum resonance
    pub fn new(sample_rate: f64) -> Self {
        let mut filter = Self {
            sample_rate,
            cutoff: 1000.0,
            resonance: 1.0,
            c: 0.0,
            r: 0.0,
            x: 0.0,
            y: 0.0,
        };
        filter.calculate_coefficients();
        filter
    }

    /// Set cutoff frequency in Hz
    pub fn set_cutoff(&mut self, hz: f64) {
        let hz = hz.clamp(MIN_CUTOFF, self.sample_rate * MAX_CUTOFF_RATIO);
        if hz != self.cutoff {
            self.cutoff = hz;
            self.calculate_coefficients();
        }
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Set resonance; values below 1.0 are raised to 1.0
    pub fn set_resonance(&mut self, resonance: f64) {
        let resonance = resonance.max(1.0);
        if resonance != self.resonance {
            self.resonance = resonance;
            self.calculate_coefficients();
        }
    }

    pub fn resonance(&self) -> f64 {
        self.resonance
    }

    fn calculate_coefficients(&mut self) {
        let z = (2.0 * PI * self.cutoff / self.sample_rate).cos();
        let zm1 = z - 1.0;
        self.c = 2.0 - 2.0 * z;
        self.r = (2.0_f64.sqrt() * (-zm1.powi(3)).sqrt() + self.resonance * zm1)
            / (self.resonance * zm1);
    }

    /// Process a single sample
    pub fn process(&mut self, input: f64) -> f64 {
        self.x += (input - self.y) * self.c;
        self.y += self.x;
        self.x *= self.r;
        self.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_creation() {
        let filter = Filter::new(32000.0);
        assert_eq!(filter.cutoff(), 1000.0);
        assert_eq!(filter.resonance(), 1.0);
    }

    #[test]
    fn test_filter_cutoff_clamping() {
        let mut filter = Filter::new(32000.0);

        filter.set_cutoff(0.0);
        assert_eq!(filter.cutoff(), MIN_CUTOFF);

        filter.set_cutoff(25000.0);
        assert_eq!(filter.cutoff(), 32000.0 * MAX_CUTOFF_RATIO);
    }

    #[test]
    fn test_filter_resonance_floor() {
        let mut filter = Filter::new(32000.0);
        filter.set_resonance(0.5);
        assert_eq!(filter.resonance(), 1.0);
        filter.set_resonance(3.0);
        assert_eq!(filter.resonance(), 3.0);
    }

    /// Steady-state RMS gain for a sine at `freq`
    fn sine_gain(filter: &mut Filter, freq: f64) -> f64 {
        let step = 2.0 * PI * freq / filter.sample_rate;
        let (mut energy_in, mut energy_out) = (0.0, 0.0);
        for n in 0..16000 {
            let x = (step * n as f64).sin();
            let y = filter.process(x);
            // Skip the transient
            if n >= 4000 {
                energy_in += x * x;
                energy_out += y * y;
            }
        }
        (energy_out / energy_in).sqrt()
    }

    #[test]
    fn test_quiet_playing_darkens_tone() {
        // Low total loudness puts the cutoff near 200 Hz
        let mut filter = Filter::new(32000.0);
        filter.set_cutoff(200.0);
        let gain = sine_gain(&mut filter, 6000.0);
        assert!(gain < 0.05, "6 kHz leaked through at {}", gain);
    }

    #[test]
    fn test_loud_playing_keeps_fundamentals() {
        let mut filter = Filter::new(32000.0);
        filter.set_cutoff(2500.0);
        let gain = sine_gain(&mut filter, 200.0);
        assert!((gain - 1.0).abs() < 0.1, "200 Hz gain was {}", gain);

        let mut fresh = Filter::new(32000.0);
        fresh.set_cutoff(2500.0);
        assert!(sine_gain(&mut fresh, 6000.0) < 0.5);
    }

    #[test]
    fn test_unity_dc_gain() {
        let mut filter = Filter::new(32000.0);
        let mut output = 0.0;
        for _ in 0..20000 {
            output = filter.process(1.0);
        }
        assert!((output - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_stable_at_max_cutoff() {
        let mut filter = Filter::new(32000.0);
        filter.set_cutoff(f64::MAX);
        for i in 0..50000 {
            let input = if (i / 3) % 2 == 0 { 1.0 } else { -1.0 };
            let output = filter.process(input);
            assert!(output.is_finite() && output.abs() < 2.0, "blew up at {}", i);
        }
    }

    #[test]
    fn test_silence_in_silence_out() {
        let mut filter = Filter::new(32000.0);
        filter.set_cutoff(0.0);
        for _ in 0..1000 {
            assert_eq!(filter.process(0.0), 0.0);
        }
    }

    #[test]
    fn test_cutoff_moves_with_history_intact() {
        let mut filter = Filter::new(32000.0);
        filter.set_cutoff(2500.0);
        for _ in 0..2000 {
            filter.process(0.5);
        }
        // A cutoff change must not glitch a settled DC level
        filter.set_cutoff(400.0);
        let output = filter.process(0.5);
        assert!((output - 0.5).abs() < 1e-3, "jumped to {}", output);
    }
}
