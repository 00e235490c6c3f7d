//! Element-based combat model.
//!
//! Pure functions only:
//! - A fixed 18-element effectiveness table
//! - Damage from power, move element, attacker element and defender element
//!
//! Guard mitigation and multi-hit scaling are separate helpers applied by
//! the resolver so [`compute_damage`] stays pure.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Same-element bonus, in percent.
pub const SAME_ELEMENT_BONUS_PERCENT: u32 = 150;

/// Divisor applied to damage taken while guarding.
pub const GUARD_DIVISOR: u32 = 3;

/// Element carried by units and moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Element {
    /// Neutral element. Never triggers an element shift.
    #[default]
    Normal,
    /// Fire.
    Fire,
    /// Water.
    Water,
    /// Electric.
    Electric,
    /// Grass.
    Grass,
    /// Ice.
    Ice,
    /// Fighting.
    Fighting,
    /// Poison.
    Poison,
    /// Ground.
    Ground,
    /// Flying.
    Flying,
    /// Psychic.
    Psychic,
    /// Bug.
    Bug,
    /// Rock.
    Rock,
    /// Ghost.
    Ghost,
    /// Dragon.
    Dragon,
    /// Dark.
    Dark,
    /// Steel.
    Steel,
    /// Fairy.
    Fairy,
}

impl Element {
    /// Every element.
    pub const ALL: [Self; 18] = [
        Self::Normal,
        Self::Fire,
        Self::Water,
        Self::Electric,
        Self::Grass,
        Self::Ice,
        Self::Fighting,
        Self::Poison,
        Self::Ground,
        Self::Flying,
        Self::Psychic,
        Self::Bug,
        Self::Rock,
        Self::Ghost,
        Self::Dragon,
        Self::Dark,
        Self::Steel,
        Self::Fairy,
    ];
}

/// Outcome class of an element matchup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Effectiveness {
    /// ×1.5.
    Super,
    /// ×1.
    #[default]
    Normal,
    /// ×0.5.
    Weak,
    /// ×0.
    Immune,
}

impl Effectiveness {
    /// Damage multiplier in percent.
    #[must_use]
    pub const fn percent(self) -> u32 {
        match self {
            Self::Super => 150,
            Self::Normal => 100,
            Self::Weak => 50,
            Self::Immune => 0,
        }
    }
}

impl fmt::Display for Effectiveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Super => "super effective",
            Self::Normal => "normal",
            Self::Weak => "not very effective",
            Self::Immune => "no effect",
        })
    }
}

/// Look up how `attack` fares against `defend`.
///
/// Pairs not listed are [`Effectiveness::Normal`].
#[must_use]
pub fn effectiveness(attack: Element, defend: Element) -> Effectiveness {
    use Effectiveness::{Immune, Super, Weak};
    use Element as E;

    match (attack, defend) {
        (E::Normal, E::Rock | E::Steel) => Weak,
        (E::Normal, E::Ghost) => Immune,

        (E::Fire, E::Grass | E::Ice | E::Bug | E::Steel) => Super,
        (E::Fire, E::Fire | E::Water | E::Rock | E::Dragon) => Weak,

        (E::Water, E::Fire | E::Ground | E::Rock) => Super,
        (E::Water, E::Water | E::Grass | E::Dragon) => Weak,

        (E::Electric, E::Water | E::Flying) => Super,
        (E::Electric, E::Electric | E::Grass | E::Dragon) => Weak,
        (E::Electric, E::Ground) => Immune,

        (E::Grass, E::Water | E::Ground | E::Rock) => Super,
        (
            E::Grass,
            E::Fire | E::Grass | E::Poison | E::Flying | E::Bug | E::Dragon | E::Steel,
        ) => Weak,

        (E::Ice, E::Grass | E::Ground | E::Flying | E::Dragon) => Super,
        (E::Ice, E::Fire | E::Water | E::Ice | E::Steel) => Weak,

        (E::Fighting, E::Normal | E::Ice | E::Rock | E::Dark | E::Steel) => Super,
        (E::Fighting, E::Poison | E::Flying | E::Psychic | E::Bug | E::Fairy) => Weak,
        (E::Fighting, E::Ghost) => Immune,

        (E::Poison, E::Grass | E::Fairy) => Super,
        (E::Poison, E::Poison | E::Ground | E::Rock | E::Ghost) => Weak,
        (E::Poison, E::Steel) => Immune,

        (E::Ground, E::Fire | E::Electric | E::Poison | E::Rock | E::Steel) => Super,
        (E::Ground, E::Grass | E::Bug) => Weak,
        (E::Ground, E::Flying) => Immune,

        (E::Flying, E::Grass | E::Fighting | E::Bug) => Super,
        (E::Flying, E::Electric | E::Rock | E::Steel) => Weak,

        (E::Psychic, E::Fighting | E::Poison) => Super,
        (E::Psychic, E::Psychic | E::Steel) => Weak,
        (E::Psychic, E::Dark) => Immune,

        (E::Bug, E::Grass | E::Psychic | E::Dark) => Super,
        (
            E::Bug,
            E::Fire | E::Fighting | E::Poison | E::Flying | E::Ghost | E::Steel | E::Fairy,
        ) => Weak,

        (E::Rock, E::Fire | E::Ice | E::Flying | E::Bug) => Super,
        (E::Rock, E::Fighting | E::Ground | E::Steel) => Weak,

        (E::Ghost, E::Psychic | E::Ghost) => Super,
        (E::Ghost, E::Dark) => Weak,
        (E::Ghost, E::Normal) => Immune,

        (E::Dragon, E::Dragon) => Super,
        (E::Dragon, E::Steel) => Weak,
        (E::Dragon, E::Fairy) => Immune,

        (E::Dark, E::Psychic | E::Ghost) => Super,
        (E::Dark, E::Fighting | E::Dark | E::Fairy) => Weak,

        (E::Steel, E::Ice | E::Rock | E::Fairy) => Super,
        (E::Steel, E::Fire | E::Water | E::Electric | E::Steel) => Weak,

        (E::Fairy, E::Fighting | E::Dragon | E::Dark) => Super,
        (E::Fairy, E::Fire | E::Poison | E::Steel) => Weak,

        _ => Effectiveness::Normal,
    }
}

/// Result of a single damage computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRoll {
    /// Final damage, already floored.
    pub amount: u32,
    /// Matchup class that produced it.
    pub effectiveness: Effectiveness,
    /// Whether the same-element bonus applied.
    pub same_element: bool,
}

/// Compute the damage a move deals.
///
/// `amount = floor(power × multiplier)` where the multiplier is the
/// same-element bonus (when `attack_element == attacker_element`) times the
/// matchup multiplier. Computed in integer percent over `u64`, so every
/// `u32` power is accepted; results past `u32::MAX` saturate.
#[must_use]
pub fn compute_damage(
    power: u32,
    attack_element: Element,
    attacker_element: Element,
    defend_element: Element,
) -> DamageRoll {
    let matchup = effectiveness(attack_element, defend_element);
    let same_element = attack_element == attacker_element;

    let same_percent = if same_element {
        SAME_ELEMENT_BONUS_PERCENT
    } else {
        100
    };
    let scaled =
        u64::from(power) * u64::from(same_percent) * u64::from(matchup.percent()) / 10_000;
    let amount = u32::try_from(scaled).unwrap_or(u32::MAX);

    DamageRoll {
        amount,
        effectiveness: matchup,
        same_element,
    }
}

/// Damage actually taken by a guarding unit.
#[must_use]
pub const fn guarded(amount: u32) -> u32 {
    amount / GUARD_DIVISOR
}

/// Total damage of a multi-hit move.
#[must_use]
pub const fn multi_hit(amount: u32, hits: u32) -> u32 {
    amount.saturating_mul(hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effectiveness_samples() {
        assert_eq!(effectiveness(Element::Water, Element::Fire), Effectiveness::Super);
        assert_eq!(effectiveness(Element::Fire, Element::Water), Effectiveness::Weak);
        assert_eq!(effectiveness(Element::Electric, Element::Ground), Effectiveness::Immune);
        assert_eq!(effectiveness(Element::Normal, Element::Normal), Effectiveness::Normal);
        assert_eq!(effectiveness(Element::Ghost, Element::Normal), Effectiveness::Immune);
        assert_eq!(effectiveness(Element::Steel, Element::Fairy), Effectiveness::Super);
    }

    #[test]
    fn test_effectiveness_is_not_symmetric() {
        assert_eq!(effectiveness(Element::Fire, Element::Grass), Effectiveness::Super);
        assert_eq!(effectiveness(Element::Grass, Element::Fire), Effectiveness::Weak);
        assert_eq!(effectiveness(Element::Ground, Element::Flying), Effectiveness::Immune);
        assert_eq!(effectiveness(Element::Flying, Element::Ground), Effectiveness::Normal);
    }

    #[test]
    fn test_table_is_total() {
        for attack in Element::ALL {
            for defend in Element::ALL {
                let tag = effectiveness(attack, defend);
                assert!(matches!(
                    tag,
                    Effectiveness::Super
                        | Effectiveness::Normal
                        | Effectiveness::Weak
                        | Effectiveness::Immune
                ));
            }
        }
    }

    #[test]
    fn test_super_with_same_element() {
        // 1.5 × 1.5 = 2.25
        let roll = compute_damage(50, Element::Water, Element::Water, Element::Fire);
        assert_eq!(roll.amount, 112);
        assert_eq!(roll.effectiveness, Effectiveness::Super);
        assert!(roll.same_element);
    }

    #[test]
    fn test_plain_damage() {
        let roll = compute_damage(40, Element::Normal, Element::Fire, Element::Water);
        assert_eq!(roll.amount, 40);
        assert!(!roll.same_element);
    }

    #[test]
    fn test_weak_floors() {
        let roll = compute_damage(25, Element::Fire, Element::Water, Element::Water);
        assert_eq!(roll.amount, 12);
        assert_eq!(roll.effectiveness, Effectiveness::Weak);
    }

    #[test]
    fn test_immune_is_zero() {
        let roll = compute_damage(110, Element::Electric, Element::Electric, Element::Ground);
        assert_eq!(roll.amount, 0);
    }

    #[test]
    fn test_guard_and_multi_hit() {
        assert_eq!(guarded(112), 37);
        assert_eq!(guarded(2), 0);
        assert_eq!(multi_hit(20, 3), 60);
        assert_eq!(multi_hit(u32::MAX, 2), u32::MAX);
    }

    #[test]
    fn test_huge_power_saturates() {
        let roll = compute_damage(1_000_000_000, Element::Water, Element::Water, Element::Fire);
        assert_eq!(roll.amount, 2_250_000_000);
        let roll = compute_damage(u32::MAX, Element::Normal, Element::Fire, Element::Fire);
        assert_eq!(roll.amount, u32::MAX);
        let roll = compute_damage(u32::MAX, Element::Water, Element::Water, Element::Fire);
        assert_eq!(roll.amount, u32::MAX);
        let roll = compute_damage(u32::MAX, Element::Fire, Element::Fire, Element::Water);
        assert_eq!(roll.amount, 3_221_225_471);
    }

    #[test]
    fn test_damage_monotonic_in_power() {
        for attack in [Element::Fire, Element::Water, Element::Normal] {
            let mut previous = 0;
            for power in 0..200 {
                let roll = compute_damage(power, attack, Element::Fire, Element::Grass);
                assert!(roll.amount >= previous);
                previous = roll.amount;
            }
        }
    }
}
