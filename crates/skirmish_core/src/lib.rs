//! # Skirmish Core
//!
//! Deterministic engine for simultaneous-turn tactical matches on a square
//! territory board.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO beyond replay files
//! - No system randomness (every roll comes from a supplied [`rng::RandomSource`])
//! - No floating-point math (uses fixed-point)
//!
//! This separation enables:
//! - Headless AI-vs-AI batches
//! - Snapshots that resume mid-resolution
//! - Replay systems
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`state`] - The match state and read accessors
//! - [`engine`] - Entry points that plan, deploy, resolve and upgrade
//! - [`scheduler`] - Resolution queue and suspend/resume drain loop
//! - [`resolve`] - Single-action resolution
//! - [`combat`] - Element chart and damage formula
//! - [`pathfinding`] - Tile-cost reachability
//! - [`territory`] - Ownership grid and component pruning
//! - [`tokens`] - Point token scheduling
//! - [`resources`] - Wood/stone nodes and stockpiles
//! - [`ai`] - Heuristic planning and targeting
//! - [`replay`] - Recording and verified playback
//! - [`math`] - Fixed-point math and board geometry

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod actions;
pub mod ai;
pub mod blocks;
pub mod combat;
pub mod config;
mod cycle;
pub mod data;
pub mod deploy;
pub mod engine;
pub mod error;
pub mod events;
pub mod math;
pub mod pathfinding;
pub mod replay;
pub mod resolve;
pub mod resources;
pub mod rng;
pub mod scheduler;
pub mod side;
pub mod state;
pub mod territory;
pub mod tokens;
pub mod units;

#[cfg(test)]
mod test_fixtures;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::actions::{
        PlanChoice, QueuedAction, SchedulerStatus, TargetSelection, UpgradeKind,
    };
    pub use crate::blocks::{Block, BlockId};
    pub use crate::combat::{Effectiveness, Element};
    pub use crate::config::{MatchSetup, RulesConfig, SideSetup, UnitPlacement};
    pub use crate::data::{MoveData, RosterData, Targeting, UnitData};
    pub use crate::error::{GameError, IllegalAction, Result};
    pub use crate::events::{EventLog, MatchEvent};
    pub use crate::math::{Cell, Direction, Fixed};
    pub use crate::replay::{Replay, ReplayInput, ReplayPlayer};
    pub use crate::resources::{ResourceCost, ResourceKind, Stockpile};
    pub use crate::rng::{seeded_rng, MatchRng, RandomSource};
    pub use crate::side::{Controller, Side};
    pub use crate::state::{MatchOutcome, MatchState, Phase};
    pub use crate::units::{UnitId, UnitInstance};
}
