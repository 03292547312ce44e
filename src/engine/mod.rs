//! Engine for touchsynth
//!
//! Ties the two timing domains together: the [`ControlLoop`] polls
//! sensors every few milliseconds, the [`Mixer`] renders one frame per
//! audio sample. They share nothing but a [`SynthContext`].

mod control;
mod mixer;
mod offline;
mod player;
mod recorder;
mod shared;

pub use control::ControlLoop;
pub use mixer::{Mixer, CUTOFF_PER_LOUDNESS, FILTER_RESONANCE, OUTPUT_GAIN};
pub use offline::OfflineRenderer;
pub use player::{list_output_devices, Player};
pub use recorder::Recorder;
pub use shared::{AtomicF64, MonitorReading, VoiceShared};

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;

use crate::calibration::{Calibration, CalibrationStore};
use crate::config::{default_voices, SynthConfig};
use crate::mapping::{IndexProvider, NoteSelector, RandomIndexProvider};
use crate::sources::{ScriptedSensor, SensorSource};
use crate::NUM_VOICES;

/// State shared by the control loop, the audio thread and the
/// calibration interface
pub struct SynthContext {
    voices: [VoiceShared; NUM_VOICES],
    calibration: ArcSwap<Calibration>,
}

impl SynthContext {
    /// Create the context with each voice at its initial pitch
    pub fn new(config: &SynthConfig, calibration: Calibration) -> Self {
        let defaults = default_voices();
        Self {
            voices: std::array::from_fn(|i| {
                let voice = config.voices.get(i).unwrap_or(&defaults[i]);
                VoiceShared::new(voice.initial_pitch)
            }),
            calibration: ArcSwap::from_pointee(calibration),
        }
    }

    pub fn voice(&self, voice: usize) -> &VoiceShared {
        &self.voices[voice]
    }

    pub fn voices(&self) -> &[VoiceShared; NUM_VOICES] {
        &self.voices
    }

    /// Current calibration table
    pub fn calibration(&self) -> Calibration {
        **self.calibration.load()
    }

    /// Replace the whole calibration table
    pub fn set_calibration(&self, calibration: Calibration) {
        self.calibration.store(Arc::new(calibration));
    }

    /// Pick up a calibration edited in `store` since the last check
    ///
    /// Returns true when the table in use changed. Blocks on file I/O,
    /// so call it from the control side only.
    pub fn refresh_calibration(&self, store: &mut dyn CalibrationStore) -> bool {
        match store.reload_if_changed() {
            Some(calibration) if calibration != self.calibration() => {
                self.set_calibration(calibration);
                true
            }
            _ => false,
        }
    }

    /// Raw reading and contact state of every sensor
    pub fn monitor_snapshot(&self) -> [MonitorReading; NUM_VOICES] {
        std::array::from_fn(|i| MonitorReading {
            raw: self.voices[i].raw(),
            state: self.voices[i].state().into(),
        })
    }

    /// One-line summary: `S1[raw vol%] S2[raw vol%] ...`
    pub fn status_line(&self) -> String {
        self.voices
            .iter()
            .enumerate()
            .map(|(i, v)| format!("S{}[{} {}%]", i + 1, v.raw(), (v.loudness() * 100.0) as u32))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The assembled instrument: shared context plus the control loop
pub struct Engine {
    config: SynthConfig,
    context: Arc<SynthContext>,
    control: ControlLoop,
}

impl Engine {
    /// Create an engine playing the configured gesture script
    ///
    /// Sensors rest at the configured reading, or at their idle
    /// calibration when none is set.
    pub fn new(config: SynthConfig, calibration: Calibration) -> Self {
        let rest = std::array::from_fn(|i| {
            config.sensor.rest_reading.unwrap_or(calibration[i].idle)
        });
        let sensor = ScriptedSensor::new(
            "script",
            config.sensor.gestures.clone(),
            rest,
            config.control.poll_interval_ms,
        );
        let provider = RandomIndexProvider::new(config.seed);
        Self::with_parts(config, calibration, Box::new(sensor), Box::new(provider))
    }

    /// Create an engine from explicit sensor and note-index sources
    pub fn with_parts(
        config: SynthConfig,
        calibration: Calibration,
        sensor: Box<dyn SensorSource>,
        provider: Box<dyn IndexProvider>,
    ) -> Self {
        let context = Arc::new(SynthContext::new(&config, calibration));
        let selector = NoteSelector::from_config(&config.voices, provider);
        let control = ControlLoop::new(Arc::clone(&context), sensor, selector);

        Self {
            config,
            context,
            control,
        }
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn context(&self) -> &Arc<SynthContext> {
        &self.context
    }

    pub fn control_mut(&mut self) -> &mut ControlLoop {
        &mut self.control
    }

    /// A renderer for an audio stream at `sample_rate`
    pub fn mixer(&self, sample_rate: f64) -> Mixer {
        Mixer::new(Arc::clone(&self.context), sample_rate)
    }

    /// Run the control loop in real time until `running` clears or `limit` passes
    pub fn run_control<F>(&mut self, running: &AtomicBool, limit: Option<Duration>, on_report: F)
    where
        F: FnMut(&SynthContext),
    {
        let timing = self.config.control.clone();
        self.control.run(&timing, running, limit, on_report);
    }

    /// Lockstep renderer at the configured sample rate
    pub fn into_offline(self) -> OfflineRenderer {
        let sample_rate = self.config.audio.sample_rate as f64;
        let frames_per_tick = self.config.frames_per_tick();
        let mixer = Mixer::new(Arc::clone(&self.context), sample_rate);
        OfflineRenderer::new(self.control, mixer, frames_per_tick)
    }
}
