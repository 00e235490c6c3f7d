//! Unit instances and their per-match state.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combat::Element;
use crate::data::{MoveData, Targeting, UnitData};
use crate::math::Cell;
use crate::resources::ResourceCost;
use crate::side::Side;

/// Unique identifier for units within a match.
pub type UnitId = u32;

/// Cycles a knocked-out unit waits before it can be redeployed.
pub const KNOCKOUT_CYCLES: u32 = 4;

/// Percent of max health a benched unit recovers each cycle.
pub const BENCH_RECOVERY_PERCENT: u32 = 15;

/// Cycle ends a burn lasts.
pub const BURN_CYCLES: u32 = 3;

/// Burn damage is max health divided by this, at least 1.
pub const BURN_DIVISOR: u32 = 8;

/// Health of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Health {
    /// Current health points.
    pub current: u32,
    /// Maximum health points.
    pub max: u32,
}

impl Health {
    /// Create new health at full.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Check if health is exhausted.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.current == 0
    }

    /// Check if at full health.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Apply damage, returning actual damage dealt.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.current);
        self.current -= actual;
        actual
    }

    /// Heal, returning actual amount healed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let headroom = self.max.saturating_sub(self.current);
        let actual = amount.min(headroom);
        self.current += actual;
        actual
    }

    /// Restore to full.
    pub fn restore(&mut self) {
        self.current = self.max;
    }

    /// Health as a percentage (0-100).
    #[must_use]
    pub fn percentage(&self) -> u32 {
        if self.max == 0 {
            0
        } else {
            (self.current * 100) / self.max
        }
    }
}

/// Lingering condition on a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCondition {
    /// Loses health at each cycle end.
    Burned {
        /// Cycle ends left.
        cycles_left: u32,
    },
    /// Cannot be given an action up to and including this cycle.
    Paralyzed {
        /// Last cycle the paralysis applies to.
        through_cycle: u64,
    },
}

impl fmt::Display for StatusCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Burned { .. } => f.write_str("burned"),
            Self::Paralyzed { .. } => f.write_str("paralyzed"),
        }
    }
}

/// A move held by a unit, with its cooldown and upgrades.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveSlot {
    /// Static definition.
    pub data: MoveData,
    /// Cycles before the move is usable again.
    pub cooldown_remaining: u32,
    /// Power added by upgrades.
    pub bonus_power: u32,
    /// Allowance added by upgrades.
    pub bonus_allowance: u32,
}

impl MoveSlot {
    /// Wrap a definition with no cooldown and no upgrades.
    #[must_use]
    pub fn new(data: MoveData) -> Self {
        Self {
            data,
            cooldown_remaining: 0,
            bonus_power: 0,
            bonus_allowance: 0,
        }
    }

    /// Move identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.data.id
    }

    /// Whether the move is off cooldown.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.cooldown_remaining == 0
    }

    /// Power including upgrades.
    #[must_use]
    pub const fn power(&self) -> u32 {
        if self.data.power == 0 {
            0
        } else {
            self.data.power.saturating_add(self.bonus_power)
        }
    }

    /// Allowance including upgrades.
    #[must_use]
    pub const fn allowance(&self) -> u32 {
        if self.data.allowance == 0 {
            0
        } else {
            self.data.allowance + self.bonus_allowance
        }
    }

    /// Effective attack range.
    #[must_use]
    pub fn attack_range(&self) -> u32 {
        self.data.attack_range()
    }

    /// Whether the move deals damage.
    #[must_use]
    pub const fn is_damaging(&self) -> bool {
        self.power() > 0 && !matches!(self.data.targeting, Targeting::SelfOnly)
    }

    /// Put the move on its full cooldown.
    pub fn spend(&mut self) {
        self.cooldown_remaining = self.data.cooldown;
    }
}

/// A unit taking part in a match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitInstance {
    /// Identifier, unique within the match.
    pub id: UnitId,
    /// Definition it was built from.
    pub definition: String,
    /// Display name.
    pub name: String,
    /// Owning side.
    pub side: Side,
    /// Health.
    pub health: Health,
    /// Current element; may change during the match.
    pub element: Element,
    /// Board cell, `None` while benched or knocked out.
    pub position: Option<Cell>,
    /// Move set in hand order.
    pub moves: Vec<MoveSlot>,
    /// Last cycle during which incoming damage is reduced.
    ///
    /// Guarding resolves after every other action of its cycle, so a guard
    /// set in cycle `n` is kept through cycle `n + 1`, one cycle longer than
    /// the cycle it was played in.
    pub guard_through: Option<u64>,
    /// Cycles until the unit recovers from a knockout.
    pub knockout_countdown: u32,
    /// Lingering condition.
    pub status: Option<StatusCondition>,
    /// Moves used at least once (their cost is waived the first time).
    pub used_moves: BTreeSet<String>,
}

impl UnitInstance {
    /// Build a fresh, benched unit from a definition.
    #[must_use]
    pub fn from_data(id: UnitId, side: Side, data: &UnitData) -> Self {
        Self {
            id,
            definition: data.id.clone(),
            name: data.name.clone(),
            side,
            health: Health::new(data.health),
            element: data.element,
            position: None,
            moves: data.moves.iter().cloned().map(MoveSlot::new).collect(),
            guard_through: None,
            knockout_countdown: 0,
            status: None,
            used_moves: BTreeSet::new(),
        }
    }

    /// Whether the unit stands on the board.
    #[must_use]
    pub const fn is_on_board(&self) -> bool {
        self.position.is_some()
    }

    /// Whether the unit is knocked out.
    #[must_use]
    pub const fn is_knocked_out(&self) -> bool {
        self.knockout_countdown > 0
    }

    /// Off the board and able to come back in.
    #[must_use]
    pub const fn is_benched(&self) -> bool {
        self.position.is_none() && self.knockout_countdown == 0
    }

    /// Whether the unit takes reduced damage during `cycle`.
    #[must_use]
    pub const fn is_guarding(&self, cycle: u64) -> bool {
        matches!(self.guard_through, Some(last) if cycle <= last)
    }

    /// Whether the unit is paralyzed during `cycle`.
    #[must_use]
    pub const fn is_paralyzed(&self, cycle: u64) -> bool {
        matches!(self.status, Some(StatusCondition::Paralyzed { through_cycle }) if cycle <= through_cycle)
    }

    /// Look up a held move.
    #[must_use]
    pub fn move_slot(&self, move_id: &str) -> Option<&MoveSlot> {
        self.moves.iter().find(|m| m.id() == move_id)
    }

    /// Look up a held move mutably.
    pub fn move_slot_mut(&mut self, move_id: &str) -> Option<&mut MoveSlot> {
        self.moves.iter_mut().find(|m| m.id() == move_id)
    }

    /// What using `slot` costs right now.
    #[must_use]
    pub fn price_of(&self, slot: &MoveSlot) -> ResourceCost {
        if self.used_moves.contains(slot.id()) {
            slot.data.cost
        } else {
            ResourceCost::FREE
        }
    }

    /// Remove the unit from the board and start its knockout countdown.
    pub fn knock_out(&mut self) {
        self.health.current = 0;
        self.position = None;
        self.knockout_countdown = KNOCKOUT_CYCLES;
        self.guard_through = None;
        self.status = None;
    }

    /// Short label used in the event log.
    #[must_use]
    pub fn label(&self) -> UnitLabel {
        UnitLabel {
            id: self.id,
            side: self.side,
            name: self.name.clone(),
        }
    }
}

/// Identity of a unit as recorded in the event log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitLabel {
    /// Unit id.
    pub id: UnitId,
    /// Owning side.
    pub side: Side,
    /// Display name.
    pub name: String,
}

impl fmt::Display for UnitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}#{}", self.side, self.name, self.id)
    }
}
