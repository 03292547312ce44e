//! Contact onset detection
//!
//! Fires once when intensity rises through the threshold. Sustained
//! contact does not retrigger; the intensity has to drop back to the
//! threshold or below first.

/// Intensity a touch must exceed to count as an onset
pub const TRIGGER_THRESHOLD: f64 = 0.2;

/// Rising-edge detector for one voice
#[derive(Debug, Clone)]
pub struct TriggerDetector {
    threshold: f64,
    previous: f64,
}

impl TriggerDetector {
    pub fn new() -> Self {
        Self {
            threshold: TRIGGER_THRESHOLD,
            previous: 0.0,
        }
    }

    /// Feed this tick's intensity; true on an onset
    ///
    /// Onset is strictly above the threshold, re-arming is at or below
    /// it, so a signal sitting exactly on the threshold never fires.
    pub fn process(&mut self, intensity: f64) -> bool {
        let fired = intensity > self.threshold && self.previous <= self.threshold;
        self.previous = intensity;
        fired
    }

    /// Intensity seen on the previous tick
    pub fn previous(&self) -> f64 {
        self.previous
    }
}

impl Default for TriggerDetector {
    fn default() -> Self {
        Self::new()
    }
}
