//! Calibration triples and the form patches that edit them

use serde::{Deserialize, Serialize};

use crate::NUM_VOICES;

/// Reference raw readings for one sensor
///
/// Smaller readings mean stronger contact, so a sane triple has
/// `idle > touch > barefoot`. Nothing enforces that ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationTriple {
    /// Reading with nothing on the sensor
    pub idle: i32,
    /// Reading under a light touch
    pub touch: i32,
    /// Reading under full skin contact
    pub barefoot: i32,
}

impl CalibrationTriple {
    pub fn new(idle: i32, touch: i32, barefoot: i32) -> Self {
        Self { idle, touch, barefoot }
    }
}

impl Default for CalibrationTriple {
    fn default() -> Self {
        Self::new(70, 40, 15)
    }
}

/// Calibration for every sensor
pub type Calibration = [CalibrationTriple; NUM_VOICES];

/// Built-in calibration used when nothing valid is persisted
pub fn default_calibration() -> Calibration {
    [CalibrationTriple::default(); NUM_VOICES]
}

/// An edit to one triple, as submitted by a calibration form
///
/// Fields arrive as text. A field that is absent, empty or not an
/// integer leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriplePatch {
    #[serde(default)]
    pub idle: Option<String>,
    #[serde(default)]
    pub touch: Option<String>,
    #[serde(default)]
    pub barefoot: Option<String>,
}

impl TriplePatch {
    /// Apply the valid fields of this patch to `triple`
    pub fn apply(&self, triple: &mut CalibrationTriple) {
        if let Some(idle) = parse_field(self.idle.as_deref()) {
            triple.idle = idle;
        }
        if let Some(touch) = parse_field(self.touch.as_deref()) {
            triple.touch = touch;
        }
        if let Some(barefoot) = parse_field(self.barefoot.as_deref()) {
            triple.barefoot = barefoot;
        }
    }
}

fn parse_field(value: Option<&str>) -> Option<i32> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}
