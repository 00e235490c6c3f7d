//! Heuristic decision engine for AI-controlled sides.
//!
//! The engine is stateless: every decision is recomputed from the current
//! [`MatchState`]. Candidates are enumerated in a fixed order and scored
//! with fixed-point math, and ties keep the earlier candidate, so the same
//! state always yields the same choice.
//!
//! ## Module Structure
//!
//! - [`candidates`]: Enumeration of legal options per unit
//! - [`scoring`]: Weighted evaluators and [`AiWeights`]

pub mod candidates;
pub mod scoring;

use std::collections::BTreeSet;

use crate::actions::{PlanChoice, TargetSelection, UpgradeKind, MAX_ACTIONS_PER_CYCLE};
use crate::math::{Cell, Fixed};
use crate::resources::ResourceCost;
use crate::side::Side;
use crate::state::MatchState;
use crate::units::{UnitId, UnitInstance};

pub use candidates::{generate, Candidate, CandidateAction};
pub use scoring::{advance_targets, enemy_base, evaluate, AiWeights, ScoreBreakdown};

/// Resources a candidate would consume.
fn price(unit: &UnitInstance, candidate: &Candidate) -> ResourceCost {
    match &candidate.action {
        CandidateAction::Card {
            move_id,
            alternate: false,
            ..
        } => unit
            .move_slot(move_id)
            .map_or(ResourceCost::FREE, |slot| unit.price_of(slot)),
        CandidateAction::Card { .. } | CandidateAction::Guard { .. } => ResourceCost::FREE,
    }
}

/// Pick this cycle's actions for `side`.
///
/// Returns at most as many actions as the side's plan still has room for,
/// each for a different unit. Units already in the plan and paralyzed units
/// are skipped. Costs are checked against the stockpile minus what the plan
/// already needs.
#[must_use]
pub fn choose_cycle_actions(state: &MatchState, side: Side) -> Vec<(UnitId, PlanChoice)> {
    let plan = state.plan(side);
    let room = MAX_ACTIONS_PER_CYCLE.saturating_sub(plan.entries.len());
    if room == 0 {
        return Vec::new();
    }

    let weights = state.rules().ai_weights;
    let cycle = state.cycle();
    let eligible: Vec<&UnitInstance> = state
        .on_board(side)
        .filter(|u| !u.is_paralyzed(cycle) && !plan.has_unit(u.id))
        .collect();

    let mut budget = state.stockpile(side);
    budget.pay(state.planned_cost(side));

    let mut scored: Vec<(Fixed, &UnitInstance, Candidate)> = eligible
        .iter()
        .flat_map(|unit| {
            generate(state, unit).into_iter().map(move |candidate| {
                let score = evaluate(state, unit, &candidate, &weights).total();
                (score, *unit, candidate)
            })
        })
        .collect();
    // Stable: equal scores keep generation order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut chosen = Vec::new();
    let mut acted = BTreeSet::new();
    for (score, unit, candidate) in scored {
        if chosen.len() >= room {
            break;
        }
        if acted.contains(&unit.id) || !budget.pay(price(unit, &candidate)) {
            continue;
        }
        tracing::debug!(side = ?side, unit = unit.id, score = %score, "AI picked {:?}", candidate.action);
        acted.insert(unit.id);
        chosen.push((unit.id, candidate.to_choice()));
    }

    // Idle units still play something rather than waste the slot.
    for unit in eligible {
        if chosen.len() >= room {
            break;
        }
        if acted.contains(&unit.id) {
            continue;
        }
        let fallback = unit
            .moves
            .iter()
            .filter(|slot| candidates::is_considered(slot))
            .find(|slot| budget.can_afford(unit.price_of(slot)));
        if let Some(slot) = fallback {
            budget.pay(unit.price_of(slot));
            acted.insert(unit.id);
            chosen.push((unit.id, PlanChoice::card(slot.id())));
        }
    }

    chosen
}

/// Pick targets for a card play at resolution time.
///
/// Returns `None` when the move has no candidate at all; the play then
/// fizzles.
#[must_use]
pub fn choose_target(
    state: &MatchState,
    unit: UnitId,
    move_id: &str,
    alternate: bool,
) -> Option<TargetSelection> {
    let unit = state.unit(unit)?;
    let weights = state.rules().ai_weights;

    let mut best: Option<(Fixed, TargetSelection)> = None;
    for candidate in generate(state, unit) {
        let CandidateAction::Card {
            move_id: id,
            alternate: flag,
            selection,
        } = &candidate.action
        else {
            continue;
        };
        if id != move_id || *flag != alternate {
            continue;
        }
        let score = evaluate(state, unit, &candidate, &weights).total();
        if best.map_or(true, |(top, _)| score > top) {
            best = Some((score, *selection));
        }
    }
    best.map(|(_, selection)| selection)
}

/// Pick where to deploy `unit`.
///
/// Among legal deploy cells, prefers cells near tokens (weighted double)
/// and near the side's advance targets. Ties go to the first cell in scan
/// order.
#[must_use]
pub fn choose_deploy_cell(state: &MatchState, unit: UnitId, side: Side) -> Option<Cell> {
    let unit = state.unit(unit)?;
    if unit.side != side || !unit.is_benched() {
        return None;
    }

    let tokens: Vec<Cell> = state.tokens().all_cells().collect();
    let targets = advance_targets(state.rules().board_size, side);

    state.legal_deploy_cells().into_iter().min_by_key(|cell| {
        let token_distance = scoring::nearest(*cell, tokens.iter().copied()).unwrap_or(0);
        let target_distance = scoring::nearest(*cell, targets).unwrap_or(0);
        token_distance * 2 + target_distance
    })
}

/// Pick the upgrade for `side`.
///
/// The strongest damaging move gains power; a side without one improves
/// the first move that moves the unit.
#[must_use]
pub fn choose_upgrade(state: &MatchState, side: Side) -> Option<(UnitId, String, UpgradeKind)> {
    let mut strongest: Option<(u32, UnitId, String)> = None;
    for unit in state.units_of(side) {
        for slot in unit.moves.iter().filter(|s| s.is_damaging()) {
            if strongest.as_ref().map_or(true, |(power, ..)| slot.power() > *power) {
                strongest = Some((slot.power(), unit.id, slot.id().to_string()));
            }
        }
    }
    if let Some((_, unit, move_id)) = strongest {
        return Some((unit, move_id, UpgradeKind::Power));
    }

    state.units_of(side).find_map(|unit| {
        unit.moves
            .iter()
            .find(|slot| slot.allowance() > 0)
            .map(|slot| (unit.id, slot.id().to_string(), UpgradeKind::Allowance))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::duel;

    #[test]
    fn test_cycle_actions_use_distinct_units() {
        let state = duel(
            &[("raichou", Cell::new(2, 2)), ("kidouba", Cell::new(2, 6))],
            &[("enshishi", Cell::new(6, 4))],
        );
        let actions = choose_cycle_actions(&state, Side::Blue);
        assert_eq!(actions.len(), 2);
        assert_ne!(actions[0].0, actions[1].0);
    }

    #[test]
    fn test_cycle_actions_respect_plan_room() {
        let mut state = duel(
            &[("raichou", Cell::new(2, 2)), ("kidouba", Cell::new(2, 6))],
            &[("enshishi", Cell::new(6, 4))],
        );
        state.submit_plan(Side::Blue, 1, PlanChoice::card("quick-attack")).unwrap();
        let actions = choose_cycle_actions(&state, Side::Blue);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].0, 2);
    }

    #[test]
    fn test_lethal_attack_preferred() {
        let mut state = duel(&[("raichou", Cell::new(3, 4))], &[("kidouba", Cell::new(4, 4))]);
        state.unit_mut(2).unwrap().health.current = 10;
        let actions = choose_cycle_actions(&state, Side::Blue);
        let (unit, choice) = &actions[0];
        assert_eq!(*unit, 1);
        match choice {
            PlanChoice::Card { alternate, .. } => assert!(!alternate),
            PlanChoice::Guard { .. } => panic!("expected an attack"),
        }
    }

    #[test]
    fn test_choose_target_matches_move() {
        let state = duel(&[("raichou", Cell::new(3, 4))], &[("kidouba", Cell::new(5, 4))]);
        let selection = choose_target(&state, 1, "thunderbolt", false).unwrap();
        assert_eq!(selection.target_unit, Some(2));
        assert_eq!(selection.destination, None);
    }

    #[test]
    fn test_choose_target_alternate_moves_straight() {
        let state = duel(&[("raichou", Cell::new(3, 4))], &[("kidouba", Cell::new(8, 8))]);
        let selection = choose_target(&state, 1, "thunder", true).unwrap();
        let destination = selection.destination.unwrap();
        assert!(destination.is_aligned(Cell::new(3, 4)));
        assert!(destination.manhattan(Cell::new(3, 4)) <= 2);
        assert!(selection.target_unit.is_none());
    }

    #[test]
    fn test_choose_target_unknown_unit() {
        let state = duel(&[("raichou", Cell::new(3, 4))], &[("kidouba", Cell::new(5, 4))]);
        assert!(choose_target(&state, 99, "thunderbolt", false).is_none());
    }

    #[test]
    fn test_deploy_cell_is_legal() {
        let mut state = duel(&[("raichou", Cell::new(1, 1))], &[("kidouba", Cell::new(7, 7))]);
        state.units.get_mut(&1).unwrap().position = None;
        let cell = choose_deploy_cell(&state, 1, Side::Blue).unwrap();
        assert!(state.deploy_cell_error(cell).is_none());
        assert!(choose_deploy_cell(&state, 1, Side::Red).is_none());
        assert!(choose_deploy_cell(&state, 2, Side::Red).is_none());
    }

    #[test]
    fn test_upgrade_picks_strongest_move() {
        let state = duel(&[("raichou", Cell::new(1, 1))], &[("kidouba", Cell::new(7, 7))]);
        assert_eq!(
            choose_upgrade(&state, Side::Blue),
            Some((1, "thunder".to_string(), UpgradeKind::Power))
        );
        assert_eq!(
            choose_upgrade(&state, Side::Red),
            Some((2, "steel-beam".to_string(), UpgradeKind::Power))
        );
    }
}
