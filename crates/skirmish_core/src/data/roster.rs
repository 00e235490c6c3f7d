//! Roster tables and the built-in standard roster.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{Ability, MoveData, MoveEffect, Targeting, UnitData, MAX_POWER};
use crate::combat::Element;
use crate::error::{GameError, Result};
use crate::resources::ResourceCost;

/// Priority of ordinary moves in the standard roster.
const PRIORITY_NORMAL: i32 = 50;
/// Priority of quick moves in the standard roster.
const PRIORITY_QUICK: i32 = 80;
/// Priority of swap moves in the standard roster.
const PRIORITY_SLOW: i32 = 10;

/// Immutable table of every unit definition a match may use.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RosterData {
    /// Unit definitions.
    pub units: Vec<UnitData>,
}

impl RosterData {
    /// Create a roster from definitions.
    #[must_use]
    pub fn new(units: Vec<UnitData>) -> Self {
        Self { units }
    }

    /// Look up a definition by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&UnitData> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Parse a roster from RON text and validate it.
    ///
    /// `source_name` only labels errors.
    pub fn from_ron_str(source_name: &str, text: &str) -> Result<Self> {
        let roster: Self = ron::from_str(text).map_err(|e| GameError::DataParseError {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        roster.validate()?;
        Ok(roster)
    }

    /// Render the roster as pretty RON.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| GameError::InvalidData(format!("Failed to serialize roster: {e}")))
    }

    /// Check identifiers and value ranges.
    pub fn validate(&self) -> Result<()> {
        let mut unit_ids = BTreeSet::new();
        for unit in &self.units {
            if !unit_ids.insert(unit.id.as_str()) {
                return Err(GameError::InvalidData(format!(
                    "duplicate unit id '{}'",
                    unit.id
                )));
            }
            if unit.health == 0 {
                return Err(GameError::InvalidData(format!(
                    "unit '{}' has zero health",
                    unit.id
                )));
            }
            if unit.moves.is_empty() {
                return Err(GameError::InvalidData(format!(
                    "unit '{}' has no moves",
                    unit.id
                )));
            }

            let mut move_ids = BTreeSet::new();
            for data in &unit.moves {
                if !move_ids.insert(data.id.as_str()) {
                    return Err(GameError::InvalidData(format!(
                        "unit '{}' lists move '{}' twice",
                        unit.id, data.id
                    )));
                }
                if data.power > MAX_POWER {
                    return Err(GameError::InvalidData(format!(
                        "move '{}' has power {} above {MAX_POWER}",
                        data.id, data.power
                    )));
                }
                if let Some(MoveEffect::MultiHit { min_hits, max_hits }) = data.effect {
                    if min_hits == 0 || min_hits > max_hits {
                        return Err(GameError::InvalidData(format!(
                            "move '{}' has hit range {min_hits}..={max_hits}",
                            data.id
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// The built-in four-unit roster.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![gekogekoga(), kidouba(), enshishi(), raichou()])
    }
}

fn swap_move() -> MoveData {
    MoveData::new("swap", Element::Normal, PRIORITY_SLOW, 0)
        .named("Swap")
        .with_targeting(Targeting::SelfOnly)
        .with_effect(MoveEffect::Swap)
        .with_cooldown(1)
}

fn gekogekoga() -> UnitData {
    UnitData::new("gekogekoga", "Gekogekoga", Element::Water, 80)
        .with_ability(Ability::ElementShift)
        .with_move(
            MoveData::new("u-turn", Element::Bug, PRIORITY_NORMAL, 20)
                .named("U-turn")
                .with_allowance(1)
                .with_range(1)
                .with_effect(MoveEffect::Swap)
                .with_cooldown(2),
        )
        .with_move(
            MoveData::new("water-shuriken", Element::Water, PRIORITY_NORMAL, 20)
                .named("Water Shuriken")
                .with_range(1)
                .with_effect(MoveEffect::MultiHit {
                    min_hits: 2,
                    max_hits: 4,
                })
                .with_cooldown(2),
        )
        .with_move(
            MoveData::new("dark-pulse", Element::Dark, PRIORITY_NORMAL, 80)
                .named("Dark Pulse")
                .with_range(1)
                .with_effect(MoveEffect::Flinch { chance: 20 })
                .with_cooldown(3),
        )
        .with_move(
            MoveData::new("shadow-sneak", Element::Dark, PRIORITY_QUICK, 30)
                .named("Shadow Sneak")
                .with_allowance(3)
                .with_range(1)
                .with_cooldown(2),
        )
        .with_move(swap_move())
}

fn kidouba() -> UnitData {
    UnitData::new("kidouba", "Kidouba", Element::Steel, 70)
        .with_move(
            MoveData::new("gallop", Element::Normal, PRIORITY_QUICK, 0)
                .named("Gallop")
                .with_allowance(5)
                .with_targeting(Targeting::SelfOnly)
                .with_cooldown(1)
                .with_cost(ResourceCost::new(1, 0)),
        )
        .with_move(
            MoveData::new("stomp", Element::Ground, PRIORITY_NORMAL, 50)
                .named("Stomp")
                .with_allowance(1)
                .with_targeting(Targeting::Surrounding)
                .with_effect(MoveEffect::Knockback { chance: 30 })
                .with_cooldown(3),
        )
        .with_move(
            MoveData::new("iron-head", Element::Steel, PRIORITY_NORMAL, 80)
                .named("Iron Head")
                .with_allowance(1)
                .with_range(1)
                .with_effect(MoveEffect::Flinch { chance: 30 })
                .with_cooldown(2),
        )
        .with_move(
            MoveData::new("steel-beam", Element::Steel, PRIORITY_NORMAL, 140)
                .named("Steel Beam")
                .with_range(3)
                .with_effect(MoveEffect::Recoil)
                .with_cooldown(5)
                .with_cost(ResourceCost::new(0, 2)),
        )
        .with_move(swap_move())
}

fn enshishi() -> UnitData {
    UnitData::new("enshishi", "Enshishi", Element::Fire, 85)
        .with_move(
            MoveData::new("flamethrower", Element::Fire, PRIORITY_NORMAL, 90)
                .named("Flamethrower")
                .with_targeting(Targeting::Line { reach: 8 })
                .with_cooldown(3)
                .with_cost(ResourceCost::new(1, 0)),
        )
        .with_move(
            MoveData::new("flare-blitz", Element::Fire, PRIORITY_NORMAL, 120)
                .named("Flare Blitz")
                .with_allowance(1)
                .with_range(1)
                .with_effect(MoveEffect::Recoil)
                .with_cooldown(4)
                .with_cost(ResourceCost::new(2, 0)),
        )
        .with_move(
            MoveData::new("fire-fang", Element::Fire, PRIORITY_NORMAL, 65)
                .named("Fire Fang")
                .with_allowance(1)
                .with_range(1)
                .with_effect(MoveEffect::Burn { chance: 30 })
                .with_cooldown(2),
        )
        .with_move(swap_move())
}

fn raichou() -> UnitData {
    UnitData::new("raichou", "Raichou", Element::Electric, 75)
        .with_move(
            MoveData::new("thunderbolt", Element::Electric, PRIORITY_NORMAL, 90)
                .named("Thunderbolt")
                .with_range(2)
                .with_cooldown(2)
                .with_cost(ResourceCost::new(0, 1)),
        )
        .with_move(
            MoveData::new("quick-attack", Element::Normal, PRIORITY_QUICK, 40)
                .named("Quick Attack")
                .with_allowance(2)
                .with_range(1)
                .with_cooldown(1),
        )
        .with_move(
            MoveData::new("volt-switch", Element::Electric, PRIORITY_NORMAL, 70)
                .named("Volt Switch")
                .with_range(2)
                .with_effect(MoveEffect::Swap)
                .with_cooldown(2),
        )
        .with_move(
            MoveData::new("thunder", Element::Electric, PRIORITY_NORMAL, 110)
                .named("Thunder")
                .with_range(3)
                .with_effect(MoveEffect::Paralyze { chance: 30 })
                .with_cooldown(4)
                .with_cost(ResourceCost::new(1, 1)),
        )
        .with_move(swap_move())
}
