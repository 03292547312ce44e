//! Scripted sensor source
//!
//! Plays back a list of timed touches. Time advances by one poll
//! interval per control tick, so a script sounds the same in real time
//! and when rendered offline.

use super::SensorSource;
use crate::config::GestureConfig;
use crate::NUM_VOICES;

/// Sensor source driven by scripted gestures
pub struct ScriptedSensor {
    name: String,
    gestures: Vec<GestureConfig>,
    rest: [i32; NUM_VOICES],
    step_ms: u64,
    ticks: u64,
    now_ms: u64,
}

impl ScriptedSensor {
    /// Create a new scripted source
    ///
    /// # Arguments
    /// * `rest` - reading of each sensor while no gesture touches it
    /// * `step_ms` - time covered by one control tick
    pub fn new(
        name: impl Into<String>,
        gestures: Vec<GestureConfig>,
        rest: [i32; NUM_VOICES],
        step_ms: u64,
    ) -> Self {
        Self {
            name: name.into(),
            gestures,
            rest,
            step_ms,
            ticks: 0,
            now_ms: 0,
        }
    }

    /// Script time of the current tick
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }
}

impl SensorSource for ScriptedSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn poll(&mut self) {
        self.now_ms = self.ticks * self.step_ms;
        self.ticks += 1;
    }

    fn read(&mut self, voice: usize) -> i32 {
        let now = self.now_ms;
        // Overlapping gestures: the strongest contact wins
        self.gestures
            .iter()
            .filter(|g| g.voice == voice && g.is_held(now))
            .map(|g| g.raw)
            .min()
            .unwrap_or(self.rest[voice])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gesture(voice: usize, start_ms: u64, duration_ms: u64, raw: i32) -> GestureConfig {
        GestureConfig {
            voice,
            start_ms,
            duration_ms,
            raw,
        }
    }

    #[test]
    fn test_rest_without_gestures() {
        let mut sensor = ScriptedSensor::new("script", Vec::new(), [70, 71, 72, 73], 10);
        sensor.poll();
        assert_eq!(sensor.name(), "script");
        assert_eq!(sensor.read(0), 70);
        assert_eq!(sensor.read(3), 73);
    }

    #[test]
    fn test_gesture_window() {
        let mut sensor = ScriptedSensor::new("script", vec![gesture(1, 20, 30, 15)], [70; 4], 10);

        let mut readings = Vec::new();
        for _ in 0..7 {
            sensor.poll();
            readings.push(sensor.read(1));
        }
        // ticks at 0, 10, 20, 30, 40, 50, 60 ms
        assert_eq!(readings, vec![70, 70, 15, 15, 15, 70, 70]);
    }

    #[test]
    fn test_gesture_held_to_end_of_time() {
        let mut sensor =
            ScriptedSensor::new("script", vec![gesture(3, 10, u64::MAX, 25)], [70; 4], 10);
        sensor.poll();
        assert_eq!(sensor.read(3), 70);
        sensor.poll();
        assert_eq!(sensor.read(3), 25);
    }

    #[test]
    fn test_gesture_only_touches_its_voice() {
        let mut sensor = ScriptedSensor::new("script", vec![gesture(2, 0, 100, 20)], [70; 4], 10);
        sensor.poll();
        assert_eq!(sensor.read(2), 20);
        assert_eq!(sensor.read(0), 70);
    }

    #[test]
    fn test_overlap_takes_strongest() {
        let gestures = vec![gesture(0, 0, 100, 40), gesture(0, 50, 100, 15)];
        let mut sensor = ScriptedSensor::new("script", gestures, [70; 4], 50);

        sensor.poll();
        assert_eq!(sensor.read(0), 40);
        sensor.poll();
        assert_eq!(sensor.now_ms(), 50);
        assert_eq!(sensor.read(0), 15);
    }
}
