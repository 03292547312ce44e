//! Sensor classifier
//!
//! Turns a raw reading into a contact intensity and a discrete contact
//! state by measuring it against the sensor's calibration triple.

use crate::calibration::CalibrationTriple;

/// Intensities below this are treated as noise
pub const NOISE_GATE: f64 = 0.08;

/// Discrete contact classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ContactState {
    #[default]
    Idle = 0,
    Touch = 1,
    Barefoot = 2,
}

impl ContactState {
    /// Decode a published state; unknown codes read as Idle
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => ContactState::Touch,
            2 => ContactState::Barefoot,
            _ => ContactState::Idle,
        }
    }

    /// Short label for status output
    pub fn label(&self) -> &'static str {
        match self {
            ContactState::Idle => "OFF",
            ContactState::Touch => "TOC",
            ContactState::Barefoot => "PIE",
        }
    }
}

impl From<ContactState> for u8 {
    fn from(state: ContactState) -> u8 {
        state as u8
    }
}

/// Result of classifying one reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub state: ContactState,
    /// Contact intensity, 0.0 (none) to 1.0 (full contact)
    pub intensity: f64,
}

/// Classifies raw readings against a calibration triple
#[derive(Debug, Clone)]
pub struct SensorClassifier {
    noise_gate: f64,
}

impl SensorClassifier {
    pub fn new() -> Self {
        Self { noise_gate: NOISE_GATE }
    }

    /// Nearest reference reading, ties going to idle, then touch
    pub fn state(&self, raw: i32, cal: &CalibrationTriple) -> ContactState {
        let d_idle = distance(raw, cal.idle);
        let d_touch = distance(raw, cal.touch);
        let d_barefoot = distance(raw, cal.barefoot);

        if d_idle <= d_touch && d_idle <= d_barefoot {
            ContactState::Idle
        } else if d_touch < d_idle && d_touch <= d_barefoot {
            ContactState::Touch
        } else {
            ContactState::Barefoot
        }
    }

    /// Linear position of `raw` between idle (0.0) and barefoot (1.0), gated
    pub fn intensity(&self, raw: i32, cal: &CalibrationTriple) -> f64 {
        let intensity = if raw <= cal.barefoot {
            1.0
        } else if raw >= cal.idle {
            0.0
        } else {
            // barefoot < raw < idle, so the span is positive
            let span = (cal.idle as i64 - cal.barefoot as i64) as f64;
            ((cal.idle as i64 - raw as i64) as f64 / span).clamp(0.0, 1.0)
        };

        if intensity < self.noise_gate {
            0.0
        } else {
            intensity
        }
    }

    pub fn classify(&self, raw: i32, cal: &CalibrationTriple) -> Classification {
        Classification {
            state: self.state(raw, cal),
            intensity: self.intensity(raw, cal),
        }
    }
}

impl Default for SensorClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn distance(a: i32, b: i32) -> i64 {
    (a as i64 - b as i64).abs()
}
