//! Single-match runner.
//!
//! Plays one AI-vs-AI match from a [`MatchConfig`] and a seed, optionally
//! recording a replay, and reduces the result to a serializable summary.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use skirmish_core::error::{GameError, Result};
use skirmish_core::events::MatchEvent;
use skirmish_core::replay::{Replay, ReplayInput};
use skirmish_core::rng::seeded_rng;
use skirmish_core::side::Side;
use skirmish_core::state::{MatchOutcome, MatchState};

use crate::config::MatchConfig;

/// Default cap on engine steps for one match.
pub const DEFAULT_MAX_STEPS: u64 = 100_000;

/// Result of one finished match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// Seed of the random stream.
    pub seed: u64,
    /// How the match ended.
    pub outcome: MatchOutcome,
    /// Cycle the match ended in.
    pub cycles: u64,
    /// Final scores, Blue then Red.
    pub scores: [u32; 2],
    /// Knockouts credited to each side, Blue then Red.
    pub knockouts: [u32; 2],
    /// Number of logged events.
    pub events: usize,
    /// Hash of the final state.
    pub final_hash: u64,
}

impl MatchSummary {
    /// Summarize a finished match.
    pub fn from_state(seed: u64, state: &MatchState) -> Result<Self> {
        let outcome = state
            .outcome()
            .ok_or_else(|| GameError::InvalidState("match has not ended".into()))?;

        let mut knockouts = [0; 2];
        for entry in state.log().entries() {
            if let MatchEvent::KnockedOut { credited, .. } = &entry.event {
                knockouts[credited.index()] += 1;
            }
        }

        Ok(Self {
            seed,
            outcome,
            cycles: state.cycle(),
            scores: state.scores(),
            knockouts,
            events: state.log().len(),
            final_hash: state.state_hash(),
        })
    }

    /// The winner, if any.
    #[must_use]
    pub const fn winner(&self) -> Option<Side> {
        self.outcome.winner()
    }
}

/// Runs one match to completion.
#[derive(Debug, Clone)]
pub struct MatchRunner {
    config: MatchConfig,
    seed: u64,
    max_steps: u64,
    record: bool,
    print_log: bool,
}

impl MatchRunner {
    /// Create a runner for `seed`.
    #[must_use]
    pub fn new(config: MatchConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            max_steps: DEFAULT_MAX_STEPS,
            record: false,
            print_log: false,
        }
    }

    /// Cap the number of engine steps.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Record a replay while playing.
    #[must_use]
    pub fn recording(mut self, record: bool) -> Self {
        self.record = record;
        self
    }

    /// Print the event log to stderr when the match ends.
    #[must_use]
    pub fn printing_log(mut self, print_log: bool) -> Self {
        self.print_log = print_log;
        self
    }

    /// Play the match.
    ///
    /// Returns the summary and, when recording, the finalized replay.
    ///
    /// # Errors
    ///
    /// Returns an error if the setup is rejected or the match does not end
    /// within the step cap.
    pub fn run(&self) -> Result<(MatchSummary, Option<Replay>)> {
        let mut state = MatchState::new(&self.config.setup, &self.config.roster)?;
        let mut rng = seeded_rng(self.seed);
        let mut replay = if self.record {
            Some(Replay::new(format!("seed-{}", self.seed), self.seed, &state)?)
        } else {
            None
        };

        let mut steps = 0;
        while !state.is_over() {
            if steps >= self.max_steps {
                return Err(GameError::InvalidState(format!(
                    "match with seed {} did not end within {} steps",
                    self.seed, self.max_steps
                )));
            }
            let progressed = match replay.as_mut() {
                Some(replay) => {
                    replay.play(&mut state, &mut rng, ReplayInput::Advance)?;
                    true
                }
                None => state.advance(&mut rng),
            };
            if !progressed {
                return Err(GameError::InvalidState(format!(
                    "match with seed {} is waiting on a human",
                    self.seed
                )));
            }
            steps += 1;
        }

        if let Some(replay) = replay.as_mut() {
            replay.finalize(&state);
        }
        if self.print_log {
            for line in state.log().lines() {
                eprintln!("{line}");
            }
        }

        let summary = MatchSummary::from_state(self.seed, &state)?;
        debug!(seed = self.seed, steps, "Match finished");
        info!(
            seed = self.seed,
            cycles = summary.cycles,
            blue = summary.scores[0],
            red = summary.scores[1],
            "{}",
            summary.outcome
        );
        Ok((summary, replay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::replay::ReplayPlayer;

    #[test]
    fn test_run_produces_summary() {
        let (summary, replay) = MatchRunner::new(MatchConfig::default(), 4).run().unwrap();
        assert_eq!(summary.seed, 4);
        assert!(summary.cycles >= 1);
        assert!(replay.is_none());
    }

    #[test]
    fn test_same_seed_same_summary() {
        let first = MatchRunner::new(MatchConfig::default(), 21).run().unwrap().0;
        let second = MatchRunner::new(MatchConfig::default(), 21).run().unwrap().0;
        assert_eq!(first, second);
    }

    #[test]
    fn test_recorded_replay_verifies() {
        let (summary, replay) = MatchRunner::new(MatchConfig::default(), 8)
            .recording(true)
            .run()
            .unwrap();
        let replay = replay.unwrap();
        assert_eq!(replay.final_hash, summary.final_hash);
        assert!(ReplayPlayer::new(replay).unwrap().verify().unwrap());
    }

    #[test]
    fn test_step_cap() {
        let err = MatchRunner::new(MatchConfig::default(), 1)
            .with_max_steps(1)
            .run()
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidState(_)));
    }
}
