//! Supplied deterministic randomness.
//!
//! The engine never creates its own randomness. Every probabilistic branch
//! (multi-hit counts, status chances, token placement, resource rolls) draws
//! from a [`RandomSource`] handed in by the caller, so two runs fed the same
//! source and the same inputs end in identical states.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of deterministic random words.
///
/// Any [`rand::RngCore`] is a `RandomSource`; tests can also implement it
/// directly to script exact outcomes.
pub trait RandomSource {
    /// Next raw 32-bit word.
    fn next_word(&mut self) -> u32;

    /// Uniform value in `low..=high`. Returns `low` when the range is empty.
    fn roll_range(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        let span = high - low + 1;
        low + self.next_word() % span
    }

    /// True with probability `percent`/100.
    fn roll_percent(&mut self, percent: u32) -> bool {
        if percent == 0 {
            return false;
        }
        self.roll_range(0, 99) < percent
    }

    /// Uniform index into a collection of `len` items, `None` when empty.
    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.roll_range(0, len as u32 - 1) as usize)
    }
}

impl<R: RngCore + ?Sized> RandomSource for R {
    fn next_word(&mut self) -> u32 {
        self.next_u32()
    }
}

/// The default seeded generator used by the headless runner and replays.
pub type MatchRng = ChaCha8Rng;

/// Create the default generator from a seed.
#[must_use]
pub fn seeded_rng(seed: u64) -> MatchRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// A scripted source that replays a fixed sequence of words, cycling.
///
/// Used in tests where a probabilistic branch must take a known path.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    words: Vec<u32>,
    cursor: usize,
}

impl ScriptedRng {
    /// Create a scripted source. An empty script always yields zero.
    #[must_use]
    pub fn new(words: Vec<u32>) -> Self {
        Self { words, cursor: 0 }
    }
}

// Not an `RngCore`, so this does not overlap with the blanket impl.
impl RandomSource for ScriptedRng {
    fn next_word(&mut self) -> u32 {
        if self.words.is_empty() {
            return 0;
        }
        let word = self.words[self.cursor % self.words.len()];
        self.cursor += 1;
        word
    }
}
