//! Per-voice state shared between the control loop and the audio thread
//!
//! Every field is a single atomic word, so reads never tear and never
//! block. The control loop writes raw reading, contact state,
//! intensity, note index and target pitch; the renderer only writes
//! loudness.

use std::sync::atomic::{AtomicI32, AtomicU64, AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

use crate::mapping::ContactState;

/// An f64 stored as bits (no AtomicF64 in std)
#[derive(Debug)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Shared state of one voice
#[derive(Debug)]
pub struct VoiceShared {
    raw: AtomicI32,
    state: AtomicU8,
    intensity: AtomicF64,
    note_index: AtomicU8,
    target_pitch: AtomicF64,
    loudness: AtomicF64,
}

impl VoiceShared {
    pub fn new(initial_pitch: f64) -> Self {
        Self {
            raw: AtomicI32::new(0),
            state: AtomicU8::new(ContactState::Idle.into()),
            intensity: AtomicF64::new(0.0),
            note_index: AtomicU8::new(0),
            target_pitch: AtomicF64::new(initial_pitch),
            loudness: AtomicF64::new(0.0),
        }
    }

    pub fn raw(&self) -> i32 {
        self.raw.load(Ordering::Relaxed)
    }

    pub fn state(&self) -> ContactState {
        ContactState::from_code(self.state.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn intensity(&self) -> f64 {
        self.intensity.load()
    }

    pub fn note_index(&self) -> usize {
        self.note_index.load(Ordering::Relaxed) as usize
    }

    #[inline]
    pub fn target_pitch(&self) -> f64 {
        self.target_pitch.load()
    }

    /// Loudness as last published by the renderer
    pub fn loudness(&self) -> f64 {
        self.loudness.load()
    }

    /// Control loop: publish one classified reading
    pub fn publish_reading(&self, raw: i32, state: ContactState, intensity: f64) {
        self.raw.store(raw, Ordering::Relaxed);
        self.state.store(state.into(), Ordering::Relaxed);
        self.intensity.store(intensity);
    }

    /// Control loop: publish a newly selected note
    pub fn publish_note(&self, index: usize, pitch: f64) {
        self.note_index.store(index as u8, Ordering::Relaxed);
        self.target_pitch.store(pitch);
    }

    /// Renderer: publish the current envelope level
    #[inline]
    pub fn publish_loudness(&self, loudness: f64) {
        self.loudness.store(loudness);
    }
}

/// One entry of the monitoring payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorReading {
    pub raw: i32,
    /// 0 = idle, 1 = touch, 2 = barefoot
    pub state: u8,
}
