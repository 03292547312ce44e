//! Synthesis building blocks
//!
//! Oscillators, the loudness envelope, pitch glide and the output filter.

mod envelope;
mod filter;
mod glide;
mod oscillator;

pub use envelope::{Envelope, EnvelopeStage, ATTACK_RATE, RELEASE_RATE};
pub use filter::{Filter, MAX_CUTOFF_RATIO, MIN_CUTOFF};
pub use glide::{PitchGlide, GLIDE_RATE};
pub use oscillator::{Oscillator, OscillatorBank};
