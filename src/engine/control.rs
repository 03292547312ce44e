//! Control loop
//!
//! Polls the sensors, classifies each reading, detects contact onsets
//! and publishes intensity and target pitch for the audio thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use super::SynthContext;
use crate::config::ControlConfig;
use crate::mapping::{NoteSelector, SensorClassifier, TriggerDetector};
use crate::sources::SensorSource;
use crate::NUM_VOICES;

/// How long the loop sleeps between elapsed-time checks
const IDLE_SLEEP: Duration = Duration::from_millis(1);

/// The sensor-polling side of the instrument
pub struct ControlLoop {
    context: Arc<SynthContext>,
    sensor: Box<dyn SensorSource>,
    classifier: SensorClassifier,
    triggers: [TriggerDetector; NUM_VOICES],
    selector: NoteSelector,
    ticks: u64,
}

impl ControlLoop {
    pub fn new(
        context: Arc<SynthContext>,
        sensor: Box<dyn SensorSource>,
        selector: NoteSelector,
    ) -> Self {
        debug!("Reading sensors from '{}'", sensor.name());
        Self {
            context,
            sensor,
            classifier: SensorClassifier::new(),
            triggers: std::array::from_fn(|_| TriggerDetector::new()),
            selector,
            ticks: 0,
        }
    }

    pub fn context(&self) -> &Arc<SynthContext> {
        &self.context
    }

    /// Number of ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Poll every sensor once; returns which voices had an onset
    pub fn tick(&mut self) -> [bool; NUM_VOICES] {
        let calibration = self.context.calibration();
        let mut fired = [false; NUM_VOICES];

        self.sensor.poll();
        for voice in 0..NUM_VOICES {
            let raw = self.sensor.read(voice);
            let reading = self.classifier.classify(raw, &calibration[voice]);

            let shared = self.context.voice(voice);
            shared.publish_reading(raw, reading.state, reading.intensity);

            if self.triggers[voice].process(reading.intensity) {
                let (index, pitch) = self.selector.select(voice);
                shared.publish_note(index, pitch);
                fired[voice] = true;
                debug!(
                    "S{} {} note {} ({:.0} Hz)",
                    voice + 1,
                    reading.state.label(),
                    index + 1,
                    pitch
                );
            }
        }

        self.ticks += 1;
        fired
    }

    /// Cooperative loop: tick every poll interval and report every
    /// report interval until `running` clears or `limit` elapses
    pub fn run<F>(
        &mut self,
        timing: &ControlConfig,
        running: &AtomicBool,
        limit: Option<Duration>,
        mut on_report: F,
    ) where
        F: FnMut(&SynthContext),
    {
        let poll = Duration::from_millis(timing.poll_interval_ms);
        let report = Duration::from_millis(timing.report_interval_ms);

        let start = Instant::now();
        let mut last_tick: Option<Instant> = None;
        let mut last_report = start;

        while running.load(Ordering::SeqCst) {
            let now = Instant::now();
            if limit.is_some_and(|limit| now.duration_since(start) >= limit) {
                break;
            }

            if last_tick.map_or(true, |last| now.duration_since(last) >= poll) {
                last_tick = Some(now);
                self.tick();
            }

            if now.duration_since(last_report) >= report {
                last_report = now;
                on_report(&self.context);
            }

            thread::sleep(IDLE_SLEEP);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{default_calibration, CalibrationTriple};
    use crate::config::{default_voices, SynthConfig};
    use crate::mapping::{ContactState, SequenceIndexProvider};

    /// Replays one row of readings per tick, holding the last row
    struct FrameSensor {
        frames: Vec<[i32; NUM_VOICES]>,
        position: usize,
    }

    impl FrameSensor {
        fn new(frames: Vec<[i32; NUM_VOICES]>) -> Self {
            Self { frames, position: 0 }
        }
    }

    impl SensorSource for FrameSensor {
        fn name(&self) -> &str {
            "frames"
        }

        fn poll(&mut self) {
            self.position += 1;
        }

        fn read(&mut self, voice: usize) -> i32 {
            let index = (self.position - 1).min(self.frames.len() - 1);
            self.frames[index][voice]
        }
    }

    fn control(frames: Vec<[i32; NUM_VOICES]>, indices: Vec<usize>) -> ControlLoop {
        let context = Arc::new(SynthContext::new(&SynthConfig::default(), default_calibration()));
        let selector = NoteSelector::from_config(
            &default_voices(),
            Box::new(SequenceIndexProvider::new(indices)),
        );
        ControlLoop::new(context, Box::new(FrameSensor::new(frames)), selector)
    }

    #[test]
    fn test_tick_publishes_readings() {
        let mut control = control(vec![[70, 55, 40, 15]], vec![0]);
        control.tick();

        let context = control.context();
        assert_eq!(context.voice(0).state(), ContactState::Idle);
        assert_eq!(context.voice(0).intensity(), 0.0);
        assert_eq!(context.voice(1).state(), ContactState::Idle);
        assert!((context.voice(1).intensity() - 15.0 / 55.0).abs() < 1e-9);
        assert_eq!(context.voice(2).state(), ContactState::Touch);
        assert_eq!(context.voice(3).state(), ContactState::Barefoot);
        assert_eq!(context.voice(3).intensity(), 1.0);
        assert_eq!(control.ticks(), 1);
    }

    #[test]
    fn test_onset_selects_note() {
        let mut control = control(
            vec![[70, 70, 70, 70], [20, 70, 70, 70], [15, 70, 70, 70]],
            vec![2],
        );

        assert_eq!(control.tick(), [false; NUM_VOICES]);
        assert_eq!(control.tick(), [true, false, false, false]);
        // Held contact does not retrigger
        assert_eq!(control.tick(), [false; NUM_VOICES]);

        let voice = control.context().voice(0);
        assert_eq!(voice.note_index(), 2);
        assert_eq!(voice.target_pitch(), 164.81);
        // Untouched voices keep their initial pitch
        assert_eq!(control.context().voice(1).target_pitch(), 329.63);
    }

    #[test]
    fn test_release_and_retouch_retriggers() {
        let mut control = control(
            vec![[15, 70, 70, 70], [70, 70, 70, 70], [15, 70, 70, 70]],
            vec![1, 0],
        );

        assert!(control.tick()[0]);
        assert_eq!(control.context().voice(0).target_pitch(), 146.83);
        assert!(!control.tick()[0]);
        assert!(control.tick()[0]);
        assert_eq!(control.context().voice(0).target_pitch(), 130.81);
    }

    #[test]
    fn test_calibration_change_applies_next_tick() {
        let mut control = control(vec![[60, 70, 70, 70]], vec![0]);
        control.tick();
        // (70 - 60) / 55
        assert!((control.context().voice(0).intensity() - 10.0 / 55.0).abs() < 1e-9);

        let mut calibration = default_calibration();
        calibration[0] = CalibrationTriple::new(60, 40, 15);
        control.context().set_calibration(calibration);
        control.tick();
        assert_eq!(control.context().voice(0).intensity(), 0.0);
    }

    #[test]
    fn test_run_stops_at_limit() {
        let mut control = control(vec![[70, 70, 70, 70]], vec![0]);
        let running = AtomicBool::new(true);
        let timing = ControlConfig {
            poll_interval_ms: 5,
            report_interval_ms: 10,
        };

        let mut reports = 0;
        control.run(&timing, &running, Some(Duration::from_millis(60)), |_| reports += 1);

        assert!(control.ticks() >= 2, "only {} ticks", control.ticks());
        assert!(reports >= 1);
    }

    #[test]
    fn test_run_respects_running_flag() {
        let mut control = control(vec![[70, 70, 70, 70]], vec![0]);
        let running = AtomicBool::new(false);
        control.run(&ControlConfig::default(), &running, None, |_| {});
        assert_eq!(control.ticks(), 0);
    }
}
