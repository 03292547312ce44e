//! touchsynth - Four capacitive touch sensors, four voices
//!
//! Each sensor's contact intensity drives a voice's loudness and, on
//! contact onset, picks a new pitch from that voice's note bank. The
//! voices are mixed through a low-pass filter whose cutoff follows how
//! hard the instrument is being played.

pub mod calibration;
pub mod config;
pub mod engine;
pub mod mapping;
pub mod sources;
pub mod synth;

pub use config::SynthConfig;
pub use engine::SynthContext;

/// Number of sensors and voices
pub const NUM_VOICES: usize = 4;
