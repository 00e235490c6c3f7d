//! Weighted evaluation of action candidates.
//!
//! Each evaluator looks at one concern and returns a fixed-point score;
//! the total is their plain sum. Changing a rule only touches the
//! evaluator that cares about it, and difficulty is tuned through
//! [`AiWeights`].

use serde::{Deserialize, Serialize};

use super::candidates::{Candidate, CandidateAction};
use crate::combat::{compute_damage, effectiveness, guarded, multi_hit, Effectiveness, Element};
use crate::data::MoveEffect;
use crate::math::{ratio, Cell, Fixed};
use crate::side::Side;
use crate::state::MatchState;
use crate::units::{MoveSlot, UnitInstance};

/// Default weight for advancing toward the enemy edge.
pub const DEFAULT_PROGRESS_WEIGHT: i32 = 100;
/// Default weight for damage as a share of the target's health.
pub const DEFAULT_KILL_WEIGHT: i32 = 80;
/// Default weight for favourable matchups.
pub const DEFAULT_TYPE_WEIGHT: i32 = 40;
/// Default weight for guarding when hurt.
pub const DEFAULT_SURVIVAL_WEIGHT: i32 = 50;
/// Default weight for threatening positions.
pub const DEFAULT_POSITIONING_WEIGHT: i32 = 30;
/// Default weight of the priority tie-break.
pub const DEFAULT_PRIORITY_WEIGHT: i32 = 10;

/// Flat score added when the expected damage is lethal.
const LETHAL_BONUS: i32 = 60;
/// Score for attacking into an immunity.
const IMMUNE_PENALTY: i32 = -50;
/// Score for attacking into a resistance.
const WEAK_PENALTY: i32 = -20;
/// Score for a recoil move while below half health.
const RECOIL_PENALTY: i32 = -30;
/// Score per enemy within striking distance of the destination.
const THREAT_BONUS: i32 = 10;
/// Manhattan distance that counts as striking distance.
const THREAT_DISTANCE: u32 = 2;
/// Distance gain that earns the full progress weight.
const PROGRESS_SCALE: u32 = 8;
/// Priority that earns the full priority weight.
const PRIORITY_SCALE: i32 = 120;

/// Weights of the decision engine's evaluators.
///
/// Weights add without normalization; any of them may be zero or negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AiWeights {
    /// Reduction in distance to the advance targets.
    pub progress: i32,
    /// Damage relative to the target's health.
    pub kill_potential: i32,
    /// Element matchup of the attack.
    pub type_advantage: i32,
    /// Guarding when hurt; avoiding recoil when hurt.
    pub survival: i32,
    /// Ending near enemies and closer to the enemy base.
    pub positioning: i32,
    /// Small bonus proportional to move priority.
    pub priority: i32,
}

impl Default for AiWeights {
    fn default() -> Self {
        Self {
            progress: DEFAULT_PROGRESS_WEIGHT,
            kill_potential: DEFAULT_KILL_WEIGHT,
            type_advantage: DEFAULT_TYPE_WEIGHT,
            survival: DEFAULT_SURVIVAL_WEIGHT,
            positioning: DEFAULT_POSITIONING_WEIGHT,
            priority: DEFAULT_PRIORITY_WEIGHT,
        }
    }
}

/// Per-evaluator scores of one candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    /// Progress toward the advance targets.
    pub progress: Fixed,
    /// Matchup of the attack.
    pub type_advantage: Fixed,
    /// Kill potential.
    pub kill_potential: Fixed,
    /// Survival.
    pub survival: Fixed,
    /// Positioning.
    pub positioning: Fixed,
    /// Priority tie-break.
    pub priority: Fixed,
}

impl ScoreBreakdown {
    /// Sum of all evaluators.
    #[must_use]
    pub fn total(&self) -> Fixed {
        self.progress
            + self.type_advantage
            + self.kill_potential
            + self.survival
            + self.positioning
            + self.priority
    }
}

/// Cells a side pushes toward: three points along the enemy's back edge.
#[must_use]
pub fn advance_targets(board_size: i32, side: Side) -> [Cell; 3] {
    let x = match side {
        Side::Blue => board_size - 1,
        Side::Red => 0,
    };
    [
        Cell::new(x, board_size / 4),
        Cell::new(x, board_size / 2),
        Cell::new(x, board_size * 3 / 4),
    ]
}

/// Middle of the enemy's back edge.
#[must_use]
pub fn enemy_base(board_size: i32, side: Side) -> Cell {
    advance_targets(board_size, side)[1]
}

/// Distance from `cell` to the nearest of `targets`.
pub(crate) fn nearest(cell: Cell, targets: impl IntoIterator<Item = Cell>) -> Option<u32> {
    targets.into_iter().map(|t| cell.manhattan(t)).min()
}

fn weight(value: i32) -> Fixed {
    Fixed::from_num(value)
}

/// Score a candidate for `unit`.
#[must_use]
pub fn evaluate(
    state: &MatchState,
    unit: &UnitInstance,
    candidate: &Candidate,
    weights: &AiWeights,
) -> ScoreBreakdown {
    let slot = match &candidate.action {
        CandidateAction::Card { move_id, .. } => unit.move_slot(move_id),
        CandidateAction::Guard { .. } => None,
    };

    ScoreBreakdown {
        progress: progress(state, unit, candidate, weights),
        type_advantage: slot.map_or(Fixed::ZERO, |s| type_advantage(state, s, candidate, weights)),
        kill_potential: slot.map_or(Fixed::ZERO, |s| kill_potential(state, unit, s, candidate, weights)),
        survival: survival(unit, slot, candidate, weights),
        positioning: positioning(state, unit, candidate, weights),
        priority: slot.map_or(Fixed::ZERO, |s| {
            weight(s.data.priority) * weight(weights.priority) / weight(PRIORITY_SCALE)
        }),
    }
}

fn progress(state: &MatchState, unit: &UnitInstance, candidate: &Candidate, weights: &AiWeights) -> Fixed {
    let (Some(from), Some(to)) = (unit.position, candidate.destination()) else {
        return Fixed::ZERO;
    };
    let targets = advance_targets(state.rules().board_size, unit.side);
    let before = nearest(from, targets).unwrap_or(0);
    let after = nearest(to, targets).unwrap_or(0);
    if after >= before {
        return Fixed::ZERO;
    }
    weight(weights.progress) * ratio(before - after, PROGRESS_SCALE)
}

fn type_advantage(state: &MatchState, slot: &MoveSlot, candidate: &Candidate, weights: &AiWeights) -> Fixed {
    if slot.power() == 0 {
        return Fixed::ZERO;
    }
    let Some(target) = candidate.focus.and_then(|id| state.unit(id)) else {
        return Fixed::ZERO;
    };
    match effectiveness(slot.data.element, target.element) {
        Effectiveness::Super => weight(weights.type_advantage),
        Effectiveness::Immune => weight(IMMUNE_PENALTY),
        Effectiveness::Weak => weight(WEAK_PENALTY),
        Effectiveness::Normal => Fixed::ZERO,
    }
}

fn kill_potential(
    state: &MatchState,
    unit: &UnitInstance,
    slot: &MoveSlot,
    candidate: &Candidate,
    weights: &AiWeights,
) -> Fixed {
    if slot.power() == 0 {
        return Fixed::ZERO;
    }
    let Some(target) = candidate.focus.and_then(|id| state.unit(id)) else {
        return Fixed::ZERO;
    };

    // An element shifter attacks with the element it shifts into.
    let shifts = state.is_element_shifter(unit.id) && slot.data.element != Element::Normal;
    let attacker_element = if shifts {
        slot.data.element
    } else {
        unit.element
    };
    let mut damage = compute_damage(slot.power(), slot.data.element, attacker_element, target.element).amount;
    if let Some(MoveEffect::MultiHit { min_hits, max_hits }) = slot.data.effect {
        damage = multi_hit(damage, min_hits.saturating_add(max_hits) / 2);
    }
    if target.is_guarding(state.cycle()) {
        damage = guarded(damage);
    }

    let health = target.health;
    let mut score = weight(weights.kill_potential) * ratio(damage.min(health.max), health.max);
    if damage > 0 && damage >= health.current {
        score += weight(LETHAL_BONUS);
    }
    score
}

fn survival(unit: &UnitInstance, slot: Option<&MoveSlot>, candidate: &Candidate, weights: &AiWeights) -> Fixed {
    let health = unit.health;
    let below_half = health.current * 2 < health.max;

    if matches!(candidate.action, CandidateAction::Guard { .. }) {
        if health.current * 10 < health.max * 3 {
            return weight(weights.survival);
        }
        if below_half {
            return weight(weights.survival) / Fixed::from_num(2);
        }
        return Fixed::ZERO;
    }

    let recoils = slot.is_some_and(|s| matches!(s.data.effect, Some(MoveEffect::Recoil)));
    if recoils && below_half {
        return weight(RECOIL_PENALTY);
    }
    Fixed::ZERO
}

fn positioning(state: &MatchState, unit: &UnitInstance, candidate: &Candidate, weights: &AiWeights) -> Fixed {
    let Some(to) = candidate.destination() else {
        return Fixed::ZERO;
    };

    let threatened = state
        .on_board(unit.side.opponent())
        .filter_map(|enemy| enemy.position)
        .filter(|cell| to.manhattan(*cell) <= THREAT_DISTANCE)
        .count() as i32;
    let mut score = weight(THREAT_BONUS * threatened);

    let base = enemy_base(state.rules().board_size, unit.side);
    if let Some(from) = unit.position {
        if to.manhattan(base) < from.manhattan(base) {
            score += weight(weights.positioning) / Fixed::from_num(2);
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::TargetSelection;
    use crate::test_fixtures::duel;
    use crate::units::UnitId;

    #[test]
    fn test_advance_targets_follow_board_size() {
        assert_eq!(
            advance_targets(13, Side::Blue),
            [Cell::new(12, 3), Cell::new(12, 6), Cell::new(12, 9)]
        );
        assert_eq!(
            advance_targets(13, Side::Red),
            [Cell::new(0, 3), Cell::new(0, 6), Cell::new(0, 9)]
        );
        assert_eq!(enemy_base(9, Side::Blue), Cell::new(8, 4));
    }

    #[test]
    fn test_breakdown_total_is_plain_sum() {
        let breakdown = ScoreBreakdown {
            progress: Fixed::from_num(25),
            type_advantage: Fixed::from_num(-20),
            kill_potential: Fixed::from_num(32),
            survival: Fixed::ZERO,
            positioning: Fixed::from_num(15),
            priority: Fixed::from_num(4),
        };
        assert_eq!(breakdown.total(), Fixed::from_num(56));
    }

    fn attack(unit: UnitId, move_id: &str, target: UnitId) -> Candidate {
        Candidate {
            unit,
            action: CandidateAction::Card {
                move_id: move_id.to_string(),
                alternate: false,
                selection: TargetSelection::none().at_unit(target),
            },
            focus: Some(target),
        }
    }

    fn kill_score(state: &MatchState, candidate: &Candidate) -> Fixed {
        let unit = state.unit(candidate.unit).unwrap();
        evaluate(state, unit, candidate, &AiWeights::default()).kill_potential
    }

    #[test]
    fn test_lethal_hit_scores_fraction_plus_bonus() {
        let state = duel(&[("raichou", Cell::new(1, 1))], &[("gekogekoga", Cell::new(2, 1))]);
        // 90 × 2.25 = 202 against 80 health.
        let score = kill_score(&state, &attack(1, "thunderbolt", 2));
        assert_eq!(score, weight(DEFAULT_KILL_WEIGHT + LETHAL_BONUS));
    }

    #[test]
    fn test_guarded_target_scores_reduced_fraction() {
        let mut state = duel(&[("raichou", Cell::new(1, 1))], &[("gekogekoga", Cell::new(2, 1))]);
        let cycle = state.cycle();
        state.unit_mut(2).unwrap().guard_through = Some(cycle);
        // 202 / 3 = 67 of 80 health, not lethal.
        let score = kill_score(&state, &attack(1, "thunderbolt", 2));
        let expected = Fixed::from_num(67);
        assert!((score - expected).abs() < Fixed::from_num(0.001));
    }

    #[test]
    fn test_multi_hit_counts_average_hits() {
        let state = duel(&[("gekogekoga", Cell::new(1, 1))], &[("enshishi", Cell::new(2, 1))]);
        // 20 × 2.25 = 45 per hit, three hits on average against 85 health.
        let score = kill_score(&state, &attack(1, "water-shuriken", 2));
        assert_eq!(score, weight(DEFAULT_KILL_WEIGHT + LETHAL_BONUS));
    }

    #[test]
    fn test_nearest() {
        let targets = advance_targets(13, Side::Blue);
        assert_eq!(nearest(Cell::new(0, 6), targets), Some(12));
        assert_eq!(nearest(Cell::new(0, 0), Vec::new()), None);
    }
}
