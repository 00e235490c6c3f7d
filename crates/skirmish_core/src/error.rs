//! Error types for the engine.

use thiserror::Error;

use crate::blocks::BlockId;
use crate::math::Cell;
use crate::side::Side;
use crate::state::Phase;
use crate::units::UnitId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all engine errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// An entry point was called with input that the rules reject.
    ///
    /// The state is left untouched when this is returned.
    #[error("Illegal action: {0}")]
    IllegalAction(#[from] IllegalAction),

    /// A roster referenced a unit definition that does not exist.
    #[error("Unknown unit definition: {0}")]
    UnknownDefinition(String),

    /// Roster or rules data failed validation.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Data text parsing error.
    #[error("Failed to parse data '{source_name}': {message}")]
    DataParseError {
        /// Name of the data source that failed to parse.
        source_name: String,
        /// Error message.
        message: String,
    },

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

/// Reasons an entry point rejects its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IllegalAction {
    /// The match already has an outcome.
    #[error("the match is over")]
    MatchOver,

    /// The call does not belong to the current phase.
    #[error("expected phase {expected:?}, match is in {actual:?}")]
    WrongPhase {
        /// Phase the call requires.
        expected: Phase,
        /// Phase the match is in.
        actual: Phase,
    },

    /// No unit with that id exists.
    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),

    /// The unit belongs to the other side.
    #[error("unit {unit} is not controlled by {side:?}")]
    NotOwned {
        /// Unit that was referenced.
        unit: UnitId,
        /// Side that made the call.
        side: Side,
    },

    /// The unit must be on the board for this call.
    #[error("unit {0} is not on the board")]
    NotOnBoard(UnitId),

    /// The unit is paralyzed this cycle.
    #[error("unit {0} is paralyzed")]
    Paralyzed(UnitId),

    /// The unit does not carry that move.
    #[error("unit {unit} has no move '{move_id}'")]
    UnknownMove {
        /// Unit that was referenced.
        unit: UnitId,
        /// Move identifier that was not found.
        move_id: String,
    },

    /// The move is still cooling down.
    #[error("move '{move_id}' is on cooldown for {remaining} more cycle(s)")]
    MoveOnCooldown {
        /// Move identifier.
        move_id: String,
        /// Cycles left on the cooldown.
        remaining: u32,
    },

    /// The side cannot pay for the move on top of its existing plan.
    #[error("cannot afford move '{0}'")]
    CannotAfford(String),

    /// The unit already has an action this cycle.
    #[error("unit {0} already has an action this cycle")]
    AlreadyActed(UnitId),

    /// The side already planned the maximum number of actions.
    #[error("{0:?} already planned the maximum number of actions")]
    PlanFull(Side),

    /// The side already confirmed its plan or upgrade.
    #[error("{0:?} has already confirmed")]
    AlreadyConfirmed(Side),

    /// The unit has no planned action to cancel.
    #[error("unit {0} has no planned action")]
    NoPlannedAction(UnitId),

    /// A guard must discard two distinct, ready moves.
    #[error("guard needs two distinct ready moves")]
    InvalidGuardDiscard,

    /// The side is driven by the decision engine.
    #[error("{0:?} is not human controlled")]
    NotHumanControlled(Side),

    /// It is the other side's turn to deploy.
    #[error("it is not {0:?}'s turn to deploy")]
    NotYourDeployTurn(Side),

    /// The unit cannot be deployed right now.
    #[error("unit {0} is not available for deployment")]
    NotDeployable(UnitId),

    /// The deploy cell breaks a placement rule.
    #[error("cannot deploy at {cell:?}: {reason}")]
    InvalidDeployCell {
        /// Requested cell.
        cell: Cell,
        /// Rule that was broken.
        reason: &'static str,
    },

    /// No action is waiting for a target.
    #[error("no action is awaiting a target")]
    NotAwaitingTarget,

    /// The supplied target cannot apply to the awaiting action.
    #[error("malformed target: {0}")]
    MalformedTarget(String),

    /// The referenced block does not exist.
    #[error("unknown block {0}")]
    UnknownBlock(BlockId),

    /// The move has nothing the requested upgrade could improve.
    #[error("move '{0}' cannot take that upgrade")]
    UpgradeNotApplicable(String),

    /// The side already used its upgrade this phase.
    #[error("{0:?} already upgraded this phase")]
    AlreadyUpgraded(Side),
}

impl GameError {
    /// Whether this error is a rule rejection rather than a data or state fault.
    #[must_use]
    pub const fn is_illegal_action(&self) -> bool {
        matches!(self, Self::IllegalAction(_))
    }
}
