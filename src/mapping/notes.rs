//! Note banks and note selection
//!
//! Every voice owns a bank of three pitches. On each contact onset the
//! selector draws an index from an [`IndexProvider`] and returns that
//! bank entry as the voice's new target pitch.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{default_voices, VoiceConfig};
use crate::NUM_VOICES;

/// Number of pitches in a bank
pub const NOTES_PER_BANK: usize = 3;

/// Source of bank indices
pub trait IndexProvider: Send {
    /// An index in `0..len`
    fn next_index(&mut self, len: usize) -> usize;
}

/// Uniform random indices; repeats are allowed
pub struct RandomIndexProvider {
    rng: StdRng,
}

impl RandomIndexProvider {
    /// Seeded for reproducible performances, or from entropy
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl IndexProvider for RandomIndexProvider {
    fn next_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Replays a fixed list of indices, cycling
pub struct SequenceIndexProvider {
    indices: Vec<usize>,
    position: usize,
}

impl SequenceIndexProvider {
    pub fn new(indices: Vec<usize>) -> Self {
        Self {
            indices,
            position: 0,
        }
    }
}

impl IndexProvider for SequenceIndexProvider {
    fn next_index(&mut self, len: usize) -> usize {
        if self.indices.is_empty() {
            return 0;
        }
        let index = self.indices[self.position % self.indices.len()];
        self.position += 1;
        index % len
    }
}

/// The three candidate pitches of one voice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteBank {
    notes: [f64; NOTES_PER_BANK],
}

impl NoteBank {
    pub fn new(notes: [f64; NOTES_PER_BANK]) -> Self {
        Self { notes }
    }
}

/// Picks a new target pitch for a voice on each onset
pub struct NoteSelector {
    banks: [NoteBank; NUM_VOICES],
    provider: Box<dyn IndexProvider>,
}

impl NoteSelector {
    pub fn new(banks: [NoteBank; NUM_VOICES], provider: Box<dyn IndexProvider>) -> Self {
        Self { banks, provider }
    }

    /// Build banks from voice config
    ///
    /// Missing voices get their built-in bank; entries past the fourth
    /// are ignored.
    pub fn from_config(voices: &[VoiceConfig], provider: Box<dyn IndexProvider>) -> Self {
        let defaults = default_voices();
        let banks = std::array::from_fn(|i| {
            NoteBank::new(voices.get(i).unwrap_or(&defaults[i]).notes)
        });
        Self::new(banks, provider)
    }

    /// Draw a note for `voice`: returns (index, pitch in Hz)
    pub fn select(&mut self, voice: usize) -> (usize, f64) {
        let bank = &self.banks[voice];
        let index = self.provider.next_index(NOTES_PER_BANK).min(NOTES_PER_BANK - 1);
        (index, bank.notes[index])
    }
}
