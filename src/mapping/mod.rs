//! Mapping from sensor readings to musical control
//!
//! Classifies readings into contact intensity, detects contact onsets,
//! and selects the pitch each onset should glide to.

mod classifier;
mod notes;
mod trigger;

pub use classifier::{Classification, ContactState, SensorClassifier, NOISE_GATE};
pub use notes::{
    IndexProvider, NoteBank, NoteSelector, RandomIndexProvider, SequenceIndexProvider,
    NOTES_PER_BANK,
};
pub use trigger::{TriggerDetector, TRIGGER_THRESHOLD};
