//! Configuration schema definitions

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::NUM_VOICES;

/// Main configuration for touchsynth
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Audio output settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// Sensor polling settings
    #[serde(default)]
    pub control: ControlConfig,

    /// Per-voice pitch settings (exactly four)
    #[serde(default = "default_voices")]
    pub voices: Vec<VoiceConfig>,

    /// Where calibration triples are persisted
    #[serde(default = "default_calibration_file")]
    pub calibration_file: PathBuf,

    /// Simulated sensor input
    #[serde(default)]
    pub sensor: SensorConfig,

    /// Seed for note selection (None = entropy)
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            audio: AudioConfig::default(),
            control: ControlConfig::default(),
            voices: default_voices(),
            calibration_file: default_calibration_file(),
            sensor: SensorConfig::default(),
            seed: None,
        }
    }
}

impl SynthConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate < 8000 || self.audio.sample_rate > 192000 {
            bail!("Sample rate must be between 8000 and 192000");
        }
        if self.audio.buffer_size < 64 || self.audio.buffer_size > 8192 {
            bail!("Buffer size must be between 64 and 8192");
        }

        if self.control.poll_interval_ms == 0 || self.control.poll_interval_ms > 1000 {
            bail!("Poll interval must be between 1 and 1000 ms");
        }
        if self.control.report_interval_ms == 0 {
            bail!("Report interval must be positive");
        }

        if self.voices.len() != NUM_VOICES {
            bail!("Expected {} voices, found {}", NUM_VOICES, self.voices.len());
        }
        for (i, voice) in self.voices.iter().enumerate() {
            if voice.initial_pitch <= 0.0 {
                bail!("Voice {} has a non-positive initial pitch", i);
            }
            if voice.notes.iter().any(|&hz| hz <= 0.0) {
                bail!("Voice {} has a non-positive note in its bank", i);
            }
        }

        for gesture in &self.sensor.gestures {
            if gesture.voice >= NUM_VOICES {
                bail!("Gesture references unknown voice {}", gesture.voice);
            }
        }

        Ok(())
    }

    /// Number of audio frames between two control ticks
    pub fn frames_per_tick(&self) -> usize {
        let frames = self.audio.sample_rate as u64 * self.control.poll_interval_ms / 1000;
        frames.max(1) as usize
    }
}

/// Audio output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz (default: 32000)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Buffer size in frames (default: 512)
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Output device name (None = default device)
    #[serde(default)]
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            buffer_size: default_buffer_size(),
            device: None,
        }
    }
}

fn default_sample_rate() -> u32 { 32000 }
fn default_buffer_size() -> usize { 512 }

/// Control loop timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Sensor polling cadence (default: 10 ms)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Status report cadence (default: 500 ms)
    #[serde(default = "default_report_interval")]
    pub report_interval_ms: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            report_interval_ms: default_report_interval(),
        }
    }
}

fn default_poll_interval() -> u64 { 10 }
fn default_report_interval() -> u64 { 500 }

/// Pitch settings for one voice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Pitch before the first touch, in Hz
    pub initial_pitch: f64,

    /// Candidate pitches drawn on contact onset, in Hz
    pub notes: [f64; 3],
}

/// C major pentatonic, spread over four octaves
pub fn default_voices() -> Vec<VoiceConfig> {
    vec![
        VoiceConfig { initial_pitch: 261.63, notes: [130.81, 146.83, 164.81] },
        VoiceConfig { initial_pitch: 329.63, notes: [196.00, 220.00, 261.63] },
        VoiceConfig { initial_pitch: 392.00, notes: [293.66, 329.63, 392.00] },
        VoiceConfig { initial_pitch: 493.88, notes: [440.00, 523.25, 587.33] },
    ]
}

fn default_calibration_file() -> PathBuf { PathBuf::from("calibration.json") }

/// Simulated sensor settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Reading reported outside gestures (None = the sensor's idle calibration)
    #[serde(default)]
    pub rest_reading: Option<i32>,

    /// Scripted touches
    #[serde(default)]
    pub gestures: Vec<GestureConfig>,
}

impl SensorConfig {
    /// End of the last gesture, in ms
    pub fn length_ms(&self) -> u64 {
        self.gestures.iter().map(GestureConfig::end_ms).max().unwrap_or(0)
    }
}

/// A single scripted touch on one sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Sensor index (0-3)
    pub voice: usize,

    /// Gesture start, relative to the performance start
    pub start_ms: u64,

    /// How long the contact is held
    pub duration_ms: u64,

    /// Raw reading while held (lower = stronger contact)
    pub raw: i32,
}

impl GestureConfig {
    /// Release time; saturates rather than overflowing
    pub fn end_ms(&self) -> u64 {
        self.start_ms.saturating_add(self.duration_ms)
    }

    /// Whether the contact is held at `now_ms`
    pub fn is_held(&self, now_ms: u64) -> bool {
        self.start_ms <= now_ms && now_ms < self.end_ms()
    }
}
