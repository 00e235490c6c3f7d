//! Property-based tests for the board algorithms and the damage formula.

use std::collections::BTreeSet;

use proptest::prelude::*;
use skirmish_core::combat::compute_damage;
use skirmish_core::math::bresenham_line;
use skirmish_core::pathfinding::{move_cost, reachable_set};
use skirmish_core::side::Controller;
use skirmish_core::territory::TerritoryGrid;
use skirmish_test_utils::determinism::verify_match_determinism;
use skirmish_test_utils::fixtures::standard_match;
use skirmish_test_utils::strategies::{
    arb_cell, arb_element, arb_painted_grid, arb_power, arb_seed, arb_side,
};

const SIZE: i32 = 7;

proptest! {
    #[test]
    fn prop_unpainted_cost_is_manhattan(start in arb_cell(SIZE), end in arb_cell(SIZE), side in arb_side()) {
        let grid = TerritoryGrid::new(SIZE);
        prop_assert_eq!(move_cost(&grid, start, end, side), Some(start.manhattan(end)));
    }

    #[test]
    fn prop_paint_never_raises_cost(
        grid in arb_painted_grid(SIZE),
        start in arb_cell(SIZE),
        end in arb_cell(SIZE),
        side in arb_side(),
    ) {
        let cost = move_cost(&grid, start, end, side);
        prop_assert!(cost.is_some_and(|c| c <= start.manhattan(end)));
    }

    #[test]
    fn prop_reachable_paths_match_costs(
        grid in arb_painted_grid(SIZE),
        start in arb_cell(SIZE),
        side in arb_side(),
        allowance in 0u32..6,
    ) {
        for reachable in reachable_set(&grid, start, allowance, side, &BTreeSet::new()) {
            prop_assert!(reachable.cost <= allowance);
            prop_assert_eq!(reachable.path.first(), Some(&start));
            prop_assert_eq!(reachable.path.last(), Some(&reachable.cell));
            let entered = reachable.path[1..]
                .iter()
                .filter(|cell| !grid.is_owned_by(**cell, side))
                .count() as u32;
            prop_assert_eq!(entered, reachable.cost);
        }
    }

    #[test]
    fn prop_prune_keeps_anchors_and_is_idempotent(
        grid in arb_painted_grid(SIZE),
        anchor in arb_cell(SIZE),
        side in arb_side(),
    ) {
        let mut grid = grid;
        let anchors = BTreeSet::from([anchor]);
        let anchor_owned = grid.is_owned_by(anchor, side);
        let before = grid.count(side);

        let removed = grid.prune_disconnected(side, &anchors);
        prop_assert_eq!(grid.count(side) + removed.len() as u32, before);
        prop_assert_eq!(grid.is_owned_by(anchor, side), anchor_owned);
        prop_assert!(removed.iter().all(|cell| grid.owner(*cell).is_none()));

        prop_assert!(grid.prune_disconnected(side, &anchors).is_empty());
    }

    #[test]
    fn prop_line_is_eight_connected(from in arb_cell(SIZE), to in arb_cell(SIZE)) {
        let line = bresenham_line(from, to);
        prop_assert_eq!(line.first(), Some(&from));
        prop_assert_eq!(line.last(), Some(&to));
        prop_assert_eq!(line.len() as u32, from.chebyshev(to) + 1);
        prop_assert!(line.windows(2).all(|w| w[0].chebyshev(w[1]) == 1));
    }

    #[test]
    fn prop_damage_grows_with_power(
        power in arb_power(),
        attack in arb_element(),
        attacker in arb_element(),
        defender in arb_element(),
    ) {
        let weaker = compute_damage(power, attack, attacker, defender);
        let stronger = compute_damage(power + 1, attack, attacker, defender);
        prop_assert!(weaker.amount <= stronger.amount);
        prop_assert!(weaker.amount <= power * 9 / 4);
    }

    #[test]
    fn prop_damage_accepts_any_power(
        power in any::<u32>(),
        attack in arb_element(),
        attacker in arb_element(),
        defender in arb_element(),
    ) {
        let roll = compute_damage(power, attack, attacker, defender);
        let bound = u64::from(power) * 9 / 4;
        prop_assert!(u64::from(roll.amount) <= bound);
        let next = compute_damage(power.saturating_add(1), attack, attacker, defender);
        prop_assert!(roll.amount <= next.amount);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn prop_ai_matches_are_deterministic(seed in arb_seed()) {
        let result = verify_match_determinism(|| standard_match(Controller::Ai, Controller::Ai), seed, 30);
        prop_assert!(result.is_deterministic, "hashes: {:?}", result.hashes);
    }
}
