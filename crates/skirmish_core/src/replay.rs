//! Replay system for recording and playing back matches.
//!
//! A replay stores the match snapshot right after creation, the seed of the
//! random stream, and every accepted entry-point call in order. Feeding the
//! same calls to the same snapshot with the same stream recreates the match
//! exactly, which [`ReplayPlayer::verify`] checks against the recorded final
//! hash.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::actions::{PlanChoice, TargetSelection, UpgradeKind};
use crate::error::{GameError, Result};
use crate::math::Cell;
use crate::rng::{seeded_rng, MatchRng, RandomSource};
use crate::side::Side;
use crate::state::MatchState;
use crate::units::UnitId;

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// One recorded entry-point call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayInput {
    /// [`MatchState::submit_plan`].
    SubmitPlan {
        /// Acting side.
        side: Side,
        /// Unit planned for.
        unit: UnitId,
        /// The plan.
        choice: PlanChoice,
    },
    /// [`MatchState::cancel_plan`].
    CancelPlan {
        /// Acting side.
        side: Side,
        /// Unit whose action is removed.
        unit: UnitId,
    },
    /// [`MatchState::confirm_plan`].
    ConfirmPlan {
        /// Acting side.
        side: Side,
    },
    /// [`MatchState::supply_target`].
    SupplyTarget {
        /// Supplied targets.
        selection: TargetSelection,
    },
    /// [`MatchState::skip_pending_action`].
    SkipPendingAction,
    /// [`MatchState::deploy_unit`].
    DeployUnit {
        /// Acting side.
        side: Side,
        /// Deployed unit.
        unit: UnitId,
        /// Target cell.
        cell: Cell,
    },
    /// [`MatchState::apply_upgrade`].
    ApplyUpgrade {
        /// Acting side.
        side: Side,
        /// Unit owning the move.
        unit: UnitId,
        /// Upgraded move.
        move_id: String,
        /// Improvement.
        kind: UpgradeKind,
    },
    /// [`MatchState::confirm_upgrade`].
    ConfirmUpgrade {
        /// Acting side.
        side: Side,
    },
    /// [`MatchState::advance`].
    Advance,
}

impl ReplayInput {
    /// Apply this call to `state`.
    ///
    /// # Errors
    ///
    /// Returns the entry point's rejection, if any.
    pub fn apply(&self, state: &mut MatchState, rng: &mut dyn RandomSource) -> Result<()> {
        match self {
            Self::SubmitPlan { side, unit, choice } => state.submit_plan(*side, *unit, choice.clone()),
            Self::CancelPlan { side, unit } => state.cancel_plan(*side, *unit),
            Self::ConfirmPlan { side } => state.confirm_plan(*side, rng),
            Self::SupplyTarget { selection } => state.supply_target(*selection, rng),
            Self::SkipPendingAction => state.skip_pending_action(rng),
            Self::DeployUnit { side, unit, cell } => state.deploy_unit(*side, *unit, *cell),
            Self::ApplyUpgrade {
                side,
                unit,
                move_id,
                kind,
            } => state.apply_upgrade(*side, *unit, move_id, *kind),
            Self::ConfirmUpgrade { side } => state.confirm_upgrade(*side, rng),
            Self::Advance => {
                state.advance(rng);
                Ok(())
            }
        }
    }
}

/// Complete replay data structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Free-form label, usually the setup name.
    pub label: String,
    /// Seed of the match's random stream.
    pub seed: u64,
    /// Serialized match state at creation.
    pub initial_state: Vec<u8>,
    /// Accepted calls in order.
    pub inputs: Vec<ReplayInput>,
    /// Cycle counter when recording stopped.
    pub final_cycle: u64,
    /// State hash when recording stopped.
    pub final_hash: u64,
}

impl Replay {
    /// Start a replay from a freshly created match.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized.
    pub fn new(label: impl Into<String>, seed: u64, initial_state: &MatchState) -> Result<Self> {
        Ok(Self {
            version: REPLAY_VERSION,
            label: label.into(),
            seed,
            initial_state: initial_state.serialize()?,
            inputs: Vec::new(),
            final_cycle: 0,
            final_hash: 0,
        })
    }

    /// Record a call that was already applied.
    pub fn record(&mut self, input: ReplayInput) {
        self.inputs.push(input);
    }

    /// Apply a call and record it if the match accepted it.
    ///
    /// # Errors
    ///
    /// Returns the entry point's rejection; nothing is recorded then.
    pub fn play(
        &mut self,
        state: &mut MatchState,
        rng: &mut dyn RandomSource,
        input: ReplayInput,
    ) -> Result<()> {
        input.apply(state, rng)?;
        self.record(input);
        Ok(())
    }

    /// Stamp the end state.
    pub fn finalize(&mut self, state: &MatchState) {
        self.final_cycle = state.cycle();
        self.final_hash = state.state_hash();
    }

    /// Save the replay to a file.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize replay: {e}")))?;
        std::fs::write(path.as_ref(), bytes)
            .map_err(|e| GameError::InvalidState(format!("Failed to write replay file: {e}")))?;
        Ok(())
    }

    /// Load a replay from a file.
    ///
    /// # Errors
    /// Returns an error if file reading or deserialization fails, or the
    /// version does not match.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| GameError::InvalidState(format!("Failed to read replay file: {e}")))?;
        let replay: Self = bincode::deserialize(&bytes)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize replay: {e}")))?;

        if replay.version != REPLAY_VERSION {
            return Err(GameError::InvalidState(format!(
                "Replay version mismatch: expected {REPLAY_VERSION}, got {}",
                replay.version
            )));
        }

        Ok(replay)
    }

    /// The match as it was when recording started.
    ///
    /// # Errors
    /// Returns an error if state deserialization fails.
    pub fn restore_initial_state(&self) -> Result<MatchState> {
        MatchState::deserialize(&self.initial_state)
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }
}

/// Replay playback controller.
#[derive(Debug)]
pub struct ReplayPlayer {
    replay: Replay,
    state: MatchState,
    rng: MatchRng,
    position: usize,
}

impl ReplayPlayer {
    /// Create a player positioned before the first call.
    ///
    /// # Errors
    /// Returns an error if the initial state cannot be restored.
    pub fn new(replay: Replay) -> Result<Self> {
        let state = replay.restore_initial_state()?;
        let rng = seeded_rng(replay.seed);
        Ok(Self {
            replay,
            state,
            rng,
            position: 0,
        })
    }

    /// Apply the next recorded call.
    ///
    /// Returns `true` if there are more calls to play.
    ///
    /// # Errors
    /// Returns an error if the match rejects a call it accepted while
    /// recording, which means playback has diverged.
    pub fn step(&mut self) -> Result<bool> {
        let Some(input) = self.replay.inputs.get(self.position) else {
            return Ok(false);
        };
        input.apply(&mut self.state, &mut self.rng).map_err(|e| {
            GameError::InvalidState(format!("Replay diverged at input {}: {e}", self.position))
        })?;
        self.position += 1;
        Ok(!self.is_finished())
    }

    /// Play every remaining call.
    ///
    /// # Errors
    /// Returns an error if playback diverges.
    pub fn run_to_end(&mut self) -> Result<()> {
        while self.step()? {}
        Ok(())
    }

    /// Restart and play up to (not including) call `target`.
    ///
    /// # Errors
    /// Returns an error if state restoration fails or playback diverges.
    pub fn seek(&mut self, target: usize) -> Result<()> {
        self.state = self.replay.restore_initial_state()?;
        self.rng = seeded_rng(self.replay.seed);
        self.position = 0;
        while self.position < target.min(self.replay.inputs.len()) {
            self.step()?;
        }
        Ok(())
    }

    /// Index of the next call to play.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Current match state.
    #[must_use]
    pub const fn state(&self) -> &MatchState {
        &self.state
    }

    /// The replay being played.
    #[must_use]
    pub const fn replay(&self) -> &Replay {
        &self.replay
    }

    /// Whether every call has been played.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.position >= self.replay.inputs.len()
    }

    /// Play the whole replay from the start and compare the end state.
    ///
    /// # Errors
    /// Returns an error if state restoration fails or playback diverges.
    pub fn verify(&mut self) -> Result<bool> {
        self.seek(self.replay.inputs.len())?;
        Ok(self.state.cycle() == self.replay.final_cycle
            && self.state.state_hash() == self.replay.final_hash)
    }
}
