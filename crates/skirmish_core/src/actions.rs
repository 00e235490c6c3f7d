//! Planned and queued actions.
//!
//! A side plans actions without targets; the scheduler merges both sides'
//! plans into one priority-ordered queue at the start of resolution.

use serde::{Deserialize, Serialize};

use crate::blocks::BlockId;
use crate::math::{Cell, Direction};
use crate::side::Side;
use crate::units::UnitId;

/// Actions a side may plan per cycle.
pub const MAX_ACTIONS_PER_CYCLE: usize = 2;

/// What a side asks a unit to do during planning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanChoice {
    /// Play a move.
    Card {
        /// Move to play.
        move_id: String,
        /// Spend the card on a short reposition instead of its effect.
        alternate: bool,
    },
    /// Guard, discarding two moves.
    Guard {
        /// Moves put on cooldown.
        discard: [String; 2],
    },
}

impl PlanChoice {
    /// Play a move normally.
    #[must_use]
    pub fn card(move_id: impl Into<String>) -> Self {
        Self::Card {
            move_id: move_id.into(),
            alternate: false,
        }
    }

    /// Play a move as a short reposition.
    #[must_use]
    pub fn alternate(move_id: impl Into<String>) -> Self {
        Self::Card {
            move_id: move_id.into(),
            alternate: true,
        }
    }

    /// Guard by discarding two moves.
    #[must_use]
    pub fn guard(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self::Guard {
            discard: [first.into(), second.into()],
        }
    }
}

/// Targets supplied for a card play at resolution time.
///
/// Every field is optional; what a move actually needs depends on its
/// allowance and targeting shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetSelection {
    /// Cell to move to.
    pub destination: Option<Cell>,
    /// Enemy unit to attack.
    pub target_unit: Option<UnitId>,
    /// Block to attack.
    pub target_block: Option<BlockId>,
    /// Direction of a line attack.
    pub direction: Option<Direction>,
}

impl TargetSelection {
    /// Selection with nothing chosen.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            destination: None,
            target_unit: None,
            target_block: None,
            direction: None,
        }
    }

    /// Set the destination.
    #[must_use]
    pub const fn to_cell(mut self, cell: Cell) -> Self {
        self.destination = Some(cell);
        self
    }

    /// Set the target unit.
    #[must_use]
    pub const fn at_unit(mut self, unit: UnitId) -> Self {
        self.target_unit = Some(unit);
        self
    }

    /// Set the target block.
    #[must_use]
    pub const fn at_block(mut self, block: BlockId) -> Self {
        self.target_block = Some(block);
        self
    }

    /// Set the line direction.
    #[must_use]
    pub const fn toward(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Whether nothing was chosen.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.destination.is_none()
            && self.target_unit.is_none()
            && self.target_block.is_none()
            && self.direction.is_none()
    }
}

/// A card play waiting in a plan or the queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovePlay {
    /// Acting unit.
    pub unit: UnitId,
    /// Move being played.
    pub move_id: String,
    /// Played as a short reposition.
    pub alternate: bool,
}

/// A guard waiting in a plan or the queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuardOrder {
    /// Guarding unit.
    pub unit: UnitId,
    /// Moves put on cooldown.
    pub discard: [String; 2],
}

/// An action planned for a unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlannedAction {
    /// Play a move.
    PlayMove(MovePlay),
    /// Guard.
    Guard(GuardOrder),
}

impl PlannedAction {
    /// Unit performing the action.
    #[must_use]
    pub const fn unit(&self) -> UnitId {
        match self {
            Self::PlayMove(play) => play.unit,
            Self::Guard(guard) => guard.unit,
        }
    }

    /// Build from a planning choice.
    #[must_use]
    pub fn from_choice(unit: UnitId, choice: PlanChoice) -> Self {
        match choice {
            PlanChoice::Card { move_id, alternate } => Self::PlayMove(MovePlay {
                unit,
                move_id,
                alternate,
            }),
            PlanChoice::Guard { discard } => Self::Guard(GuardOrder { unit, discard }),
        }
    }
}

/// A planned action with its submission order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanEntry {
    /// Global submission sequence, used to break priority ties.
    pub sequence: u64,
    /// The action.
    pub action: PlannedAction,
}

/// One side's plan for the current cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SidePlan {
    /// Planned actions in submission order.
    pub entries: Vec<PlanEntry>,
    /// The side has locked in its plan.
    pub confirmed: bool,
}

impl SidePlan {
    /// Whether `unit` already has an action.
    #[must_use]
    pub fn has_unit(&self, unit: UnitId) -> bool {
        self.entries.iter().any(|e| e.action.unit() == unit)
    }

    /// Whether no more actions fit.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_ACTIONS_PER_CYCLE
    }
}

/// An action in the resolution queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueuedAction {
    /// Owning side.
    pub side: Side,
    /// Resolved priority; higher goes first.
    pub priority: i32,
    /// Submission sequence.
    pub sequence: u64,
    /// The action.
    pub action: PlannedAction,
}

/// Where the scheduler stands inside the resolution phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchedulerStatus {
    /// Not resolving.
    #[default]
    Idle,
    /// Popping actions off the queue.
    Draining,
    /// Suspended until a human supplies targets for this action.
    AwaitingTarget(QueuedAction),
}

impl SchedulerStatus {
    /// The action waiting for input, if any.
    #[must_use]
    pub const fn awaiting(&self) -> Option<&QueuedAction> {
        match self {
            Self::AwaitingTarget(action) => Some(action),
            Self::Idle | Self::Draining => None,
        }
    }
}

/// Improvement granted during the upgrade phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    /// Raise the move's power.
    Power,
    /// Raise the move's movement allowance.
    Allowance,
}

/// One side's progress through the upgrade phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpgradeStatus {
    /// Upgrade already applied this phase.
    pub applied: bool,
    /// The side is done upgrading.
    pub confirmed: bool,
}
