//! Move (card) definitions.

use serde::{Deserialize, Serialize};

use crate::combat::Element;
use crate::resources::ResourceCost;

/// Highest base power a roster may give a move.
pub const MAX_POWER: u32 = 1_000;

/// How a move picks what it hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Targeting {
    /// One enemy unit or block within attack range.
    #[default]
    Single,
    /// Every enemy along a straight line in a chosen direction.
    Line {
        /// Cells the beam travels.
        reach: u32,
    },
    /// Every enemy in the eight cells around the user.
    Surrounding,
    /// No target at all.
    SelfOnly,
}

/// Special effect attached to a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveEffect {
    /// Strikes a random number of times in `min_hits..=max_hits`.
    MultiHit {
        /// Fewest hits.
        min_hits: u32,
        /// Most hits.
        max_hits: u32,
    },
    /// The user takes a third of the damage it dealt.
    Recoil,
    /// Chance to push the target one cell away from the user.
    Knockback {
        /// Percent chance per target.
        chance: u32,
    },
    /// The user trades places with a benched ally. Damaging moves only
    /// swap when the attack landed.
    Swap,
    /// Chance to cancel the target's unresolved action this cycle.
    Flinch {
        /// Percent chance per target.
        chance: u32,
    },
    /// Chance to stop the target from acting next cycle.
    Paralyze {
        /// Percent chance per target.
        chance: u32,
    },
    /// Chance to burn the target for several cycles.
    Burn {
        /// Percent chance per target.
        chance: u32,
    },
}

/// Data-driven move definition.
///
/// # Example RON
///
/// ```ron
/// MoveData(
///     id: "water-shuriken",
///     name: "Water Shuriken",
///     element: Water,
///     priority: 50,
///     power: 20,
///     attack_range: Some(1),
///     effect: Some(MultiHit(min_hits: 2, max_hits: 4)),
///     cooldown: 2,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveData {
    /// Unique identifier within a unit's move set.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Element of the move.
    #[serde(default)]
    pub element: Element,

    /// Ordering value within a cycle; higher resolves first.
    #[serde(default)]
    pub priority: i32,

    /// Attack power. Zero means the move deals no damage.
    #[serde(default)]
    pub power: u32,

    /// Movement allowance in cost units.
    #[serde(default)]
    pub allowance: u32,

    /// Explicit attack range. Derived from the allowance when absent.
    #[serde(default)]
    pub attack_range: Option<u32>,

    /// Target shape.
    #[serde(default)]
    pub targeting: Targeting,

    /// Optional special effect.
    #[serde(default)]
    pub effect: Option<MoveEffect>,

    /// Cycles the move stays unavailable after use.
    #[serde(default = "default_cooldown")]
    pub cooldown: u32,

    /// Resources paid after the first use.
    #[serde(default)]
    pub cost: ResourceCost,
}

const fn default_cooldown() -> u32 {
    1
}

impl MoveData {
    /// Create a plain single-target move with default cooldown.
    #[must_use]
    pub fn new(id: impl Into<String>, element: Element, priority: i32, power: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            element,
            priority,
            power,
            allowance: 0,
            attack_range: None,
            targeting: Targeting::Single,
            effect: None,
            cooldown: default_cooldown(),
            cost: ResourceCost::FREE,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the movement allowance.
    #[must_use]
    pub fn with_allowance(mut self, allowance: u32) -> Self {
        self.allowance = allowance;
        self
    }

    /// Set an explicit attack range.
    #[must_use]
    pub fn with_range(mut self, range: u32) -> Self {
        self.attack_range = Some(range);
        self
    }

    /// Set the targeting shape.
    #[must_use]
    pub fn with_targeting(mut self, targeting: Targeting) -> Self {
        self.targeting = targeting;
        self
    }

    /// Attach a special effect.
    #[must_use]
    pub fn with_effect(mut self, effect: MoveEffect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// Set the cooldown.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: u32) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Set the resource cost.
    #[must_use]
    pub fn with_cost(mut self, cost: ResourceCost) -> Self {
        self.cost = cost;
        self
    }

    /// Effective attack range: explicit, line reach, or 1 for moving
    /// attacks and 2 for stationary ones.
    #[must_use]
    pub fn attack_range(&self) -> u32 {
        if let Targeting::Line { reach } = self.targeting {
            return reach;
        }
        self.attack_range
            .unwrap_or(if self.allowance > 0 { 1 } else { 2 })
    }

    /// Whether the move deals damage.
    #[must_use]
    pub const fn is_damaging(&self) -> bool {
        self.power > 0 && !matches!(self.targeting, Targeting::SelfOnly)
    }

    /// Whether the move trades places with a benched ally.
    #[must_use]
    pub const fn swaps(&self) -> bool {
        matches!(self.effect, Some(MoveEffect::Swap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_attack_range() {
        let mover = MoveData::new("a", Element::Normal, 0, 10).with_allowance(2);
        let stationary = MoveData::new("b", Element::Normal, 0, 10);
        let explicit = MoveData::new("c", Element::Normal, 0, 10).with_range(3);
        let line = MoveData::new("d", Element::Fire, 0, 10).with_targeting(Targeting::Line { reach: 8 });
        assert_eq!(mover.attack_range(), 1);
        assert_eq!(stationary.attack_range(), 2);
        assert_eq!(explicit.attack_range(), 3);
        assert_eq!(line.attack_range(), 8);
    }

    #[test]
    fn test_ron_defaults() {
        let text = r#"MoveData(id: "poke", name: "Poke", power: 15)"#;
        let data: MoveData = ron::from_str(text).unwrap();
        assert_eq!(data.cooldown, 1);
        assert_eq!(data.element, Element::Normal);
        assert_eq!(data.targeting, Targeting::Single);
        assert!(data.cost.is_free());
    }
}
