//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a match produces identical
//! results given the same setup and the same seeded random stream.
//!
//! # Testing Strategy
//!
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: damage multipliers and AI scores use
//!   [`skirmish_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: the match state keeps units, blocks and
//!   tokens in ordered maps and always iterates in id order.
//!
//! - **System randomness**: every roll comes from the supplied
//!   [`skirmish_core::rng::RandomSource`].

use std::thread;

use skirmish_core::rng::{seeded_rng, MatchRng};
use skirmish_core::state::MatchState;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps taken per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic match).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the match was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Match is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Verify that a match advanced `steps` times with `seed` twice ends in
/// the same state.
///
/// Steps after the match is over are no-ops.
pub fn verify_match_determinism<F>(setup_fn: F, seed: u64, steps: u64) -> DeterminismResult
where
    F: Fn() -> MatchState,
{
    verify_determinism(
        2,
        steps,
        || (setup_fn(), seeded_rng(seed)),
        |(state, rng): &mut (MatchState, MatchRng)| {
            state.advance(rng);
        },
        |pair: &(MatchState, MatchRng)| pair.0.state_hash(),
    )
}

/// Run N matches in parallel using scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling or
/// memory layout differences.
pub fn run_parallel_matches<F>(setup_fn: F, seed: u64, num_matches: usize, steps: u64) -> DeterminismResult
where
    F: Fn() -> MatchState + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_matches)
            .map(|_| {
                s.spawn(|| {
                    let mut state = setup_fn();
                    let mut rng = seeded_rng(seed);
                    for _ in 0..steps {
                        state.advance(&mut rng);
                    }
                    state.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("match thread panicked"))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        steps,
    }
}

/// Advance two identical matches step by step and report the first step
/// whose hashes differ.
///
/// Returns `None` if they never diverge, `Some(0)` if the fresh states
/// already differ.
pub fn find_first_divergence<F>(setup_fn: F, seed: u64, steps: u64) -> Option<u64>
where
    F: Fn() -> MatchState,
{
    let mut first = setup_fn();
    let mut second = setup_fn();
    let mut first_rng = seeded_rng(seed);
    let mut second_rng = seeded_rng(seed);

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for step in 1..=steps {
        first.advance(&mut first_rng);
        second.advance(&mut second_rng);

        if first.state_hash() != second.state_hash() {
            tracing::warn!(step, cycle = first.cycle(), "Matches diverged");
            return Some(step);
        }
    }

    None
}

/// Verify that a snapshot taken after `steps` restores to the same hash.
pub fn verify_snapshot_determinism<F>(setup_fn: F, seed: u64, steps: u64) -> bool
where
    F: Fn() -> MatchState,
{
    let mut state = setup_fn();
    let mut rng = seeded_rng(seed);
    for _ in 0..steps {
        state.advance(&mut rng);
    }

    let hash_before = state.state_hash();

    let Ok(bytes) = state.serialize() else {
        return false;
    };
    let Ok(restored) = MatchState::deserialize(&bytes) else {
        return false;
    };

    hash_before == restored.state_hash()
}
