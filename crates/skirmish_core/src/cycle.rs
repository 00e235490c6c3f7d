//! End-of-cycle housekeeping.
//!
//! Runs once the queue is empty: status ticks, recovery, knockout timers,
//! territory pruning, tokens, resources, counters and the victory check,
//! then opens the next phase.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::events::MatchEvent;
use crate::math::Cell;
use crate::resources::produce;
use crate::rng::RandomSource;
use crate::side::Side;
use crate::state::{MatchOutcome, MatchState};
use crate::units::{StatusCondition, UnitId, BENCH_RECOVERY_PERCENT, BURN_DIVISOR};

impl MatchState {
    pub(crate) fn end_cycle(&mut self, rng: &mut dyn RandomSource) {
        let ended = self.cycle;

        self.tick_burns();
        if self.is_over() {
            return;
        }
        self.recover_bench();
        self.count_down_knockouts();
        self.expire_conditions(ended);
        self.prune_territory();
        self.collect_tokens();

        let (roll, payouts) = produce(
            &self.resource_nodes,
            &self.territory,
            &mut self.stockpiles,
            rng,
        );
        for payout in payouts {
            self.push_event(MatchEvent::ResourceProduced {
                roll,
                side: payout.side,
                kind: payout.kind,
            });
        }

        let blocked: BTreeSet<Cell> = self.blocks.values().map(|b| b.cell).collect();
        let zone = self.rules.center_zone();
        let count = self.tokens.spawn(&self.territory, zone, &blocked, rng);
        self.push_event(MatchEvent::TokensAnnounced { count });

        self.plans = Default::default();

        let [blue, red] = self.scores();
        self.push_event(MatchEvent::CycleScored { blue, red });
        tracing::debug!(cycle = ended, blue, red, "Cycle ended");

        #[cfg(feature = "debug-validation")]
        self.validate_board();

        if let Some(outcome) = self.cycle_outcome(ended) {
            self.finish(outcome);
            return;
        }

        let boundary = self.cycle_in_phase >= self.rules.cycles_per_phase;
        self.cycle += 1;
        if boundary {
            self.cycle_in_phase = 1;
            self.phase_number += 1;
            for slot in self.units.values_mut().flat_map(|u| u.moves.iter_mut()) {
                slot.cooldown_remaining = 0;
            }
            self.push_event(MatchEvent::CardsRefreshed);
        } else {
            self.cycle_in_phase += 1;
        }

        if boundary && self.rules.upgrades_enabled {
            self.enter_upgrade();
        } else {
            self.enter_deploy_or_planning();
            self.run_ai_deploys();
        }
    }

    fn tick_burns(&mut self) {
        let burning: Vec<UnitId> = self
            .units
            .values()
            .filter(|u| u.is_on_board() && matches!(u.status, Some(StatusCondition::Burned { .. })))
            .map(|u| u.id)
            .collect();

        for id in burning {
            let Some(unit) = self.unit_mut(id) else {
                continue;
            };
            let amount = (unit.health.max / BURN_DIVISOR).max(1);
            unit.health.apply_damage(amount);
            if let Some(StatusCondition::Burned { cycles_left }) = &mut unit.status {
                *cycles_left = cycles_left.saturating_sub(1);
                if *cycles_left == 0 {
                    unit.status = None;
                }
            }
            let depleted = unit.health.is_depleted();
            let side = unit.side;
            let event = MatchEvent::BurnDamage {
                unit: unit.label(),
                amount,
            };
            self.push_event(event);

            if depleted {
                self.knock_out_unit(id, side.opponent());
                if self.is_over() {
                    return;
                }
            }
        }
    }

    fn recover_bench(&mut self) {
        let mut events = Vec::new();
        for unit in self.units.values_mut() {
            if !unit.is_benched() || unit.health.is_full() {
                continue;
            }
            let amount = unit.health.heal(unit.health.max * BENCH_RECOVERY_PERCENT / 100);
            if amount > 0 {
                events.push(MatchEvent::Recovered {
                    unit: unit.label(),
                    amount,
                });
            }
        }
        for event in events {
            self.push_event(event);
        }
    }

    fn count_down_knockouts(&mut self) {
        let mut events = Vec::new();
        for unit in self.units.values_mut().filter(|u| u.is_knocked_out()) {
            unit.knockout_countdown -= 1;
            if unit.knockout_countdown == 0 {
                unit.health.restore();
                events.push(MatchEvent::Revived { unit: unit.label() });
            }
        }
        for event in events {
            self.push_event(event);
        }
    }

    fn expire_conditions(&mut self, ended: u64) {
        for unit in self.units.values_mut() {
            if unit.guard_through.is_some_and(|last| last <= ended) {
                unit.guard_through = None;
            }
            if matches!(unit.status, Some(StatusCondition::Paralyzed { through_cycle }) if through_cycle <= ended) {
                unit.status = None;
            }
        }
    }

    fn prune_territory(&mut self) {
        for side in Side::ALL {
            let anchors = self.unit_cells(side);
            let removed = self.territory.prune_disconnected(side, &anchors);
            if !removed.is_empty() {
                self.push_event(MatchEvent::TerritoryPruned {
                    side,
                    cells: removed.len(),
                });
            }
        }
    }

    fn collect_tokens(&mut self) {
        for collected in self.tokens.collect(&self.territory) {
            self.banked[collected.side.index()] += collected.value;
            self.push_event(MatchEvent::TokenCollected {
                side: collected.side,
                cell: collected.cell,
                value: collected.value,
            });
        }
    }

    /// Log any on-board unit sharing a cell with another unit or a block.
    #[cfg(feature = "debug-validation")]
    fn validate_board(&self) {
        let mut seen: BTreeSet<Cell> = self.blocks.values().map(|b| b.cell).collect();
        for unit in self.units.values() {
            if let Some(cell) = unit.position {
                if !seen.insert(cell) {
                    tracing::error!(unit = unit.id, x = cell.x, y = cell.y, "Cell occupied twice");
                }
            }
        }
    }

    /// Result of the score check after cycle `ended`, if the match is over.
    ///
    /// A side at the victory score wins; when both are there the higher
    /// score wins and a tie plays on. At the cycle cap the higher score
    /// wins and equal scores draw.
    fn cycle_outcome(&self, ended: u64) -> Option<MatchOutcome> {
        let [blue, red] = self.scores();
        let threshold = self.rules.victory_score;
        let leader = match blue.cmp(&red) {
            Ordering::Greater => Some(Side::Blue),
            Ordering::Less => Some(Side::Red),
            Ordering::Equal => None,
        };

        if blue >= threshold || red >= threshold {
            if let Some(side) = leader {
                return Some(MatchOutcome::Winner(side));
            }
        }
        if ended >= self.rules.max_cycles {
            return Some(leader.map_or(MatchOutcome::Draw, MatchOutcome::Winner));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;
    use crate::state::Phase;
    use crate::test_fixtures::duel;
    use crate::units::{BURN_CYCLES, KNOCKOUT_CYCLES};

    fn quiet_rng() -> ScriptedRng {
        ScriptedRng::new(vec![0])
    }

    #[test]
    fn test_burn_ticks_and_expires() {
        let mut state = duel(&[("raichou", Cell::new(1, 1))], &[("kidouba", Cell::new(7, 7))]);
        state.unit_mut(2).unwrap().status = Some(StatusCondition::Burned {
            cycles_left: BURN_CYCLES,
        });
        for _ in 0..BURN_CYCLES {
            state.end_cycle(&mut quiet_rng());
        }
        let kidouba = state.unit(2).unwrap();
        assert_eq!(kidouba.health.current, 70 - 3 * (70 / 8));
        assert_eq!(kidouba.status, None);
    }

    #[test]
    fn test_knockout_countdown_revives() {
        let mut state = duel(&[("raichou", Cell::new(1, 1))], &[("kidouba", Cell::new(7, 7))]);
        state.knock_out_unit(2, Side::Blue);
        for _ in 0..KNOCKOUT_CYCLES - 1 {
            state.end_cycle(&mut quiet_rng());
            assert!(state.unit(2).unwrap().is_knocked_out());
        }
        state.end_cycle(&mut quiet_rng());
        let kidouba = state.unit(2).unwrap();
        assert!(kidouba.is_benched());
        assert!(kidouba.health.is_full());
    }

    #[test]
    fn test_guard_lasts_through_next_cycle() {
        let mut state = duel(&[("raichou", Cell::new(1, 1))], &[("kidouba", Cell::new(7, 7))]);
        let cycle = state.cycle();
        state.unit_mut(1).unwrap().guard_through = Some(cycle + 1);
        state.end_cycle(&mut quiet_rng());
        assert!(state.unit(1).unwrap().is_guarding(state.cycle()));
        state.end_cycle(&mut quiet_rng());
        assert_eq!(state.unit(1).unwrap().guard_through, None);
    }

    #[test]
    fn test_counters_and_refresh_at_boundary() {
        let mut state = duel(&[("raichou", Cell::new(1, 1))], &[("kidouba", Cell::new(7, 7))]);
        state.unit_mut(1).unwrap().moves[0].cooldown_remaining = 3;
        let per_phase = state.rules().cycles_per_phase;
        for _ in 0..per_phase {
            state.end_cycle(&mut quiet_rng());
        }
        assert_eq!(state.cycle(), u64::from(per_phase) + 1);
        assert_eq!(state.cycle_in_phase(), 1);
        assert_eq!(state.phase_number(), 2);
        assert!(state.unit(1).unwrap().moves[0].is_ready());
        assert_eq!(state.phase(), Phase::Planning);
    }

    #[test]
    fn test_cycle_cap_draw() {
        let mut state = duel(&[("raichou", Cell::new(1, 1))], &[("kidouba", Cell::new(7, 7))]);
        state.rules.max_cycles = 1;
        state.end_cycle(&mut quiet_rng());
        assert_eq!(state.outcome(), Some(MatchOutcome::Draw));
    }

    #[test]
    fn test_threshold_tie_plays_on() {
        let mut state = duel(&[("raichou", Cell::new(1, 1))], &[("kidouba", Cell::new(7, 7))]);
        state.rules.victory_score = 1;
        assert_eq!(state.cycle_outcome(1), None);
        state.banked[Side::Red.index()] = 4;
        assert_eq!(state.cycle_outcome(1), Some(MatchOutcome::Winner(Side::Red)));
    }

    #[test]
    fn test_disconnected_paint_is_pruned() {
        let mut state = duel(&[("raichou", Cell::new(1, 1))], &[("kidouba", Cell::new(7, 7))]);
        state.territory.paint(Cell::new(4, 0), Side::Blue);
        state.end_cycle(&mut quiet_rng());
        assert!(!state.territory().is_owned_by(Cell::new(4, 0), Side::Blue));
        assert!(state.territory().is_owned_by(Cell::new(1, 1), Side::Blue));
    }
}
