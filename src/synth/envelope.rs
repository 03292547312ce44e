//! Loudness envelope
//!
//! Follows a voice's contact intensity with a fast attack and a slow
//! release, so a lifted finger leaves a decaying tail.

/// Per-sample smoothing while loudness rises
pub const ATTACK_RATE: f64 = 0.1;

/// Per-sample smoothing while loudness falls
pub const RELEASE_RATE: f64 = 0.01;

/// Loudness below this with no input is flushed to zero
const SILENCE_FLOOR: f64 = 1e-9;

/// Envelope stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeStage {
    #[default]
    Silent,
    Attacking,
    Releasing,
}

/// Asymmetric one-pole follower
#[derive(Debug, Clone)]
pub struct Envelope {
    attack: f64,
    release: f64,
    level: f64,
    stage: EnvelopeStage,
}

impl Envelope {
    pub fn new() -> Self {
        Self {
            attack: ATTACK_RATE,
            release: RELEASE_RATE,
            level: 0.0,
            stage: EnvelopeStage::Silent,
        }
    }

    /// Current loudness, 0.0-1.0
    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Silent
    }

    /// Move one sample toward `intensity` and return the new loudness
    #[inline]
    pub fn process(&mut self, intensity: f64) -> f64 {
        let target = intensity.clamp(0.0, 1.0);
        let diff = target - self.level;

        if diff > 0.0 {
            self.level += diff * self.attack;
            self.stage = EnvelopeStage::Attacking;
        } else {
            self.level += diff * self.release;
            if target == 0.0 && self.level < SILENCE_FLOOR {
                self.level = 0.0;
                self.stage = EnvelopeStage::Silent;
            } else if diff < 0.0 {
                self.stage = EnvelopeStage::Releasing;
            }
        }

        self.level
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}
