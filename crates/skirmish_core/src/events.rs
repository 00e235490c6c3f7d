//! Match event log.
//!
//! Every resolved effect is recorded as a [`MatchEvent`] tagged with the
//! cycle it happened in. The log is append-only for the lifetime of a
//! match and renders as human-readable lines.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::actions::UpgradeKind;
use crate::blocks::BlockId;
use crate::combat::{Effectiveness, Element};
use crate::math::Cell;
use crate::resources::ResourceKind;
use crate::side::Side;
use crate::state::{MatchOutcome, Phase};
use crate::units::{StatusCondition, UnitId, UnitLabel};

/// Something that happened during a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchEvent {
    /// A phase began.
    PhaseStarted {
        /// New phase.
        phase: Phase,
        /// Phase counter.
        phase_number: u32,
    },
    /// A unit entered the board.
    Deployed {
        /// Deployed unit.
        unit: UnitLabel,
        /// Cell it was placed on.
        cell: Cell,
        /// The cell became a home cell.
        home: bool,
    },
    /// A unit started resolving a move.
    MoveUsed {
        /// Acting unit.
        unit: UnitLabel,
        /// Move name.
        move_name: String,
        /// Played as a reposition.
        alternate: bool,
    },
    /// A unit raised its guard.
    GuardRaised {
        /// Guarding unit.
        unit: UnitLabel,
        /// Moves discarded.
        discarded: [String; 2],
    },
    /// A unit took on a new element.
    ElementShifted {
        /// Unit.
        unit: UnitLabel,
        /// New element.
        element: Element,
    },
    /// A unit moved.
    Moved {
        /// Unit.
        unit: UnitLabel,
        /// Start cell.
        from: Cell,
        /// End cell.
        to: Cell,
        /// Allowance spent.
        cost: u32,
    },
    /// A requested move could not be made.
    MoveBlocked {
        /// Unit.
        unit: UnitLabel,
        /// Requested destination.
        destination: Cell,
    },
    /// A unit was damaged.
    Damaged {
        /// Attacker.
        attacker: UnitLabel,
        /// Defender.
        target: UnitLabel,
        /// Health lost.
        amount: u32,
        /// Type matchup.
        effectiveness: Effectiveness,
        /// Number of hits.
        hits: u32,
        /// The defender was guarding.
        guarded: bool,
    },
    /// A block lost integrity.
    BlockChipped {
        /// Block.
        block: BlockId,
        /// Block cell.
        cell: Cell,
        /// Integrity left.
        remaining: u32,
    },
    /// A block was destroyed.
    BlockDestroyed {
        /// Block.
        block: BlockId,
        /// Block cell.
        cell: Cell,
    },
    /// A unit was knocked out.
    KnockedOut {
        /// Defeated unit.
        unit: UnitLabel,
        /// Side credited with the kill.
        credited: Side,
        /// Points credited.
        bonus: u32,
    },
    /// A unit was hurt by its own attack.
    Recoil {
        /// Unit.
        unit: UnitLabel,
        /// Health lost.
        amount: u32,
    },
    /// A unit was pushed.
    KnockedBack {
        /// Pushed unit.
        unit: UnitLabel,
        /// New cell.
        to: Cell,
    },
    /// Two allies traded places.
    Swapped {
        /// Unit that left the board.
        outgoing: UnitLabel,
        /// Unit that took its cell.
        incoming: UnitLabel,
        /// The shared cell.
        cell: Cell,
    },
    /// A unit flinched and lost its pending action.
    Flinched {
        /// Unit.
        unit: UnitLabel,
    },
    /// A status condition took hold.
    StatusApplied {
        /// Unit.
        unit: UnitLabel,
        /// Condition.
        status: StatusCondition,
    },
    /// A burn dealt damage.
    BurnDamage {
        /// Unit.
        unit: UnitLabel,
        /// Health lost.
        amount: u32,
    },
    /// An effect had nothing to act on.
    Fizzled {
        /// Acting unit.
        unit: UnitLabel,
        /// Move name.
        move_name: String,
        /// What was missing.
        reason: String,
    },
    /// A queued action was dropped without resolving.
    ActionSkipped {
        /// Acting unit.
        unit: UnitId,
        /// Move or guard that was dropped.
        action: String,
        /// Why it was dropped.
        reason: String,
    },
    /// Resolution paused for a human target choice.
    AwaitingTarget {
        /// Acting unit.
        unit: UnitLabel,
        /// Move name.
        move_name: String,
    },
    /// A benched unit recovered health.
    Recovered {
        /// Unit.
        unit: UnitLabel,
        /// Health gained.
        amount: u32,
    },
    /// A knocked-out unit can be deployed again.
    Revived {
        /// Unit.
        unit: UnitLabel,
    },
    /// Disconnected territory was lost.
    TerritoryPruned {
        /// Owner that lost the cells.
        side: Side,
        /// Cells reverted.
        cells: usize,
    },
    /// A token was banked.
    TokenCollected {
        /// Side credited.
        side: Side,
        /// Token cell.
        cell: Cell,
        /// Points.
        value: u32,
    },
    /// A resource node paid out.
    ResourceProduced {
        /// Die roll.
        roll: u32,
        /// Side paid.
        side: Side,
        /// Resource.
        kind: ResourceKind,
    },
    /// New tokens were announced for the next cycle.
    TokensAnnounced {
        /// Pending tokens after the spawn.
        count: usize,
    },
    /// All cooldowns were reset.
    CardsRefreshed,
    /// A move was upgraded.
    Upgraded {
        /// Unit.
        unit: UnitLabel,
        /// Move name.
        move_name: String,
        /// Improvement.
        kind: UpgradeKind,
    },
    /// Score totals at the end of a cycle.
    CycleScored {
        /// Blue total.
        blue: u32,
        /// Red total.
        red: u32,
    },
    /// The match ended.
    MatchEnded {
        /// Result.
        outcome: MatchOutcome,
    },
}

impl fmt::Display for MatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PhaseStarted {
                phase,
                phase_number,
            } => write!(f, "=== phase {phase_number}: {phase:?} ==="),
            Self::Deployed { unit, cell, home } => {
                write!(f, "{unit} deployed at ({}, {})", cell.x, cell.y)?;
                if *home {
                    f.write_str(" [home]")?;
                }
                Ok(())
            }
            Self::MoveUsed {
                unit,
                move_name,
                alternate,
            } => {
                if *alternate {
                    write!(f, "{unit} repositions using {move_name}")
                } else {
                    write!(f, "{unit} uses {move_name}")
                }
            }
            Self::GuardRaised { unit, discarded } => write!(
                f,
                "{unit} guards (discarding {} and {})",
                discarded[0], discarded[1]
            ),
            Self::ElementShifted { unit, element } => {
                write!(f, "{unit} shifts to {element:?}")
            }
            Self::Moved {
                unit,
                from,
                to,
                cost,
            } => write!(
                f,
                "{unit} moves ({}, {}) -> ({}, {}) for {cost}",
                from.x, from.y, to.x, to.y
            ),
            Self::MoveBlocked { unit, destination } => write!(
                f,
                "{unit} cannot reach ({}, {})",
                destination.x, destination.y
            ),
            Self::Damaged {
                attacker,
                target,
                amount,
                effectiveness,
                hits,
                guarded,
            } => {
                write!(f, "{attacker} hits {target} for {amount}")?;
                if *hits > 1 {
                    write!(f, " ({hits} hits)")?;
                }
                if *effectiveness != Effectiveness::Normal {
                    write!(f, " - {effectiveness}")?;
                }
                if *guarded {
                    f.write_str(" [guarded]")?;
                }
                Ok(())
            }
            Self::BlockChipped {
                block, remaining, ..
            } => write!(f, "block {block} chipped, {remaining} left"),
            Self::BlockDestroyed { block, cell } => {
                write!(f, "block {block} at ({}, {}) destroyed", cell.x, cell.y)
            }
            Self::KnockedOut {
                unit,
                credited,
                bonus,
            } => write!(f, "{unit} is knocked out, {credited} +{bonus}"),
            Self::Recoil { unit, amount } => write!(f, "{unit} takes {amount} recoil"),
            Self::KnockedBack { unit, to } => {
                write!(f, "{unit} is pushed to ({}, {})", to.x, to.y)
            }
            Self::Swapped {
                outgoing, incoming, ..
            } => write!(f, "{outgoing} swaps out for {incoming}"),
            Self::Flinched { unit } => write!(f, "{unit} flinched"),
            Self::StatusApplied { unit, status } => write!(f, "{unit} is {status}"),
            Self::BurnDamage { unit, amount } => write!(f, "{unit} burns for {amount}"),
            Self::Fizzled {
                unit,
                move_name,
                reason,
            } => write!(f, "{unit}'s {move_name} fizzles: {reason}"),
            Self::ActionSkipped {
                unit,
                action,
                reason,
            } => write!(f, "action {action} of unit {unit} skipped: {reason}"),
            Self::AwaitingTarget { unit, move_name } => {
                write!(f, "waiting for a target for {unit}'s {move_name}")
            }
            Self::Recovered { unit, amount } => {
                write!(f, "{unit} recovers {amount} on the bench")
            }
            Self::Revived { unit } => write!(f, "{unit} is ready to redeploy"),
            Self::TerritoryPruned { side, cells } => {
                write!(f, "{side} loses {cells} disconnected cell(s)")
            }
            Self::TokenCollected { side, cell, value } => write!(
                f,
                "{side} collects a {value}-point token at ({}, {})",
                cell.x, cell.y
            ),
            Self::ResourceProduced { roll, side, kind } => {
                write!(f, "rolled {roll}: {side} gains 1 {kind:?}")
            }
            Self::TokensAnnounced { count } => write!(f, "{count} token(s) incoming"),
            Self::CardsRefreshed => f.write_str("all cards refreshed"),
            Self::Upgraded {
                unit,
                move_name,
                kind,
            } => write!(f, "{unit} upgrades {move_name} ({kind:?})"),
            Self::CycleScored { blue, red } => write!(f, "score Blue {blue} - Red {red}"),
            Self::MatchEnded { outcome } => write!(f, "match over: {outcome}"),
        }
    }
}

/// An event stamped with the cycle it happened in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Cycle number.
    pub cycle: u64,
    /// The event.
    pub event: MatchEvent,
}

/// Append-only record of a match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<LogEntry>,
}

impl EventLog {
    /// Append an event.
    pub fn push(&mut self, cycle: u64, event: MatchEvent) {
        tracing::debug!(cycle, "{event}");
        self.entries.push(LogEntry { cycle, event });
    }

    /// All entries in order.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Entries of one cycle.
    pub fn for_cycle(&self, cycle: u64) -> impl Iterator<Item = &MatchEvent> {
        self.entries
            .iter()
            .filter(move |e| e.cycle == cycle)
            .map(|e| &e.event)
    }

    /// Rendered lines, prefixed by cycle.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| format!("[{}] {}", e.cycle, e.event))
            .collect()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label() -> UnitLabel {
        UnitLabel {
            id: 1,
            side: Side::Blue,
            name: "Raichou".into(),
        }
    }

    #[test]
    fn test_log_is_append_only_and_filterable() {
        let mut log = EventLog::default();
        log.push(1, MatchEvent::CardsRefreshed);
        log.push(2, MatchEvent::Flinched { unit: label() });
        log.push(2, MatchEvent::TokensAnnounced { count: 3 });
        assert_eq!(log.len(), 3);
        assert_eq!(log.for_cycle(2).count(), 2);
        assert_eq!(log.lines()[0], "[1] all cards refreshed");
    }

    #[test]
    fn test_damage_line() {
        let event = MatchEvent::Damaged {
            attacker: label(),
            target: UnitLabel {
                id: 5,
                side: Side::Red,
                name: "Kidouba".into(),
            },
            amount: 112,
            effectiveness: Effectiveness::Super,
            hits: 1,
            guarded: false,
        };
        let line = event.to_string();
        assert!(line.starts_with("Blue Raichou#1 hits Red Kidouba#5 for 112"));
    }
}
