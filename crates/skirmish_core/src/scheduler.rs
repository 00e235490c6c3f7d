//! Resolution queue and drain loop.
//!
//! Both sides' confirmed plans merge into one queue ordered by descending
//! priority, with submission order breaking ties. The queue is drained one
//! action at a time. A human card play that still needs a destination,
//! target or direction suspends the drain in
//! [`SchedulerStatus::AwaitingTarget`]; the suspended action and the rest of
//! the queue live in the state, so a snapshot taken there resumes exactly.

use std::collections::VecDeque;

use crate::actions::{MovePlay, PlannedAction, QueuedAction, SchedulerStatus, TargetSelection};
use crate::ai;
use crate::data::Targeting;
use crate::events::MatchEvent;
use crate::rng::RandomSource;
use crate::side::Side;
use crate::state::{MatchState, Phase};

/// Priority of a guard; guards always resolve last.
pub const GUARD_PRIORITY: i32 = i32::MIN;

/// Order actions by descending priority, then by submission sequence.
#[must_use]
pub fn order_queue(mut actions: Vec<QueuedAction>) -> VecDeque<QueuedAction> {
    actions.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.sequence.cmp(&b.sequence))
    });
    actions.into()
}

impl MatchState {
    /// Merge both plans into the queue and start draining.
    pub(crate) fn begin_resolution(&mut self, rng: &mut dyn RandomSource) {
        self.phase = Phase::Resolution;
        for unit in self.units.values_mut() {
            for slot in &mut unit.moves {
                slot.cooldown_remaining = slot.cooldown_remaining.saturating_sub(1);
            }
        }

        let mut actions = Vec::new();
        for side in Side::ALL {
            for entry in &self.plans[side.index()].entries {
                let priority = match &entry.action {
                    PlannedAction::Guard(_) => GUARD_PRIORITY,
                    PlannedAction::PlayMove(play) => self
                        .unit(play.unit)
                        .and_then(|u| u.move_slot(&play.move_id))
                        .map_or(GUARD_PRIORITY, |slot| slot.data.priority),
                };
                actions.push(QueuedAction {
                    side,
                    priority,
                    sequence: entry.sequence,
                    action: entry.action.clone(),
                });
            }
        }
        self.queue = order_queue(actions);

        self.push_event(MatchEvent::PhaseStarted {
            phase: Phase::Resolution,
            phase_number: self.phase_number,
        });
        tracing::debug!(cycle = self.cycle, actions = self.queue.len(), "Resolution started");
        self.drain(rng);
    }

    /// Pop and resolve actions until the queue empties, the match ends or
    /// a human must pick targets.
    pub(crate) fn drain(&mut self, rng: &mut dyn RandomSource) {
        self.status = SchedulerStatus::Draining;

        while !self.is_over() {
            let Some(action) = self.queue.pop_front() else {
                break;
            };
            if let Some(reason) = self.orphan_reason(&action) {
                self.skip_action(&action, reason);
                continue;
            }

            match &action.action {
                PlannedAction::Guard(order) => self.resolve_guard(order),
                PlannedAction::PlayMove(play) if self.controller(action.side).is_human() => {
                    if self.needs_input(play) {
                        self.suspend(action);
                        return;
                    }
                    self.resolve_card(play, TargetSelection::none(), rng);
                }
                PlannedAction::PlayMove(play) => {
                    let selection =
                        ai::choose_target(self, play.unit, &play.move_id, play.alternate)
                            .unwrap_or_default();
                    self.resolve_card(play, selection, rng);
                }
            }
        }

        self.status = SchedulerStatus::Idle;
        if self.is_over() {
            self.queue.clear();
            return;
        }
        self.end_cycle(rng);
    }

    fn suspend(&mut self, action: QueuedAction) {
        if let PlannedAction::PlayMove(play) = &action.action {
            if let Some(unit) = self.unit(play.unit) {
                let move_name = unit
                    .move_slot(&play.move_id)
                    .map_or_else(|| play.move_id.clone(), |slot| slot.data.name.clone());
                let event = MatchEvent::AwaitingTarget {
                    unit: unit.label(),
                    move_name,
                };
                self.push_event(event);
            }
        }
        tracing::debug!(side = ?action.side, "Awaiting target");
        self.status = SchedulerStatus::AwaitingTarget(action);
    }

    /// Whether a card play cannot resolve without a human choice.
    pub(crate) fn needs_input(&self, play: &MovePlay) -> bool {
        if play.alternate {
            return true;
        }
        let Some(slot) = self.unit(play.unit).and_then(|u| u.move_slot(&play.move_id)) else {
            return false;
        };
        slot.allowance() > 0
            || (slot.is_damaging()
                && matches!(slot.data.targeting, Targeting::Single | Targeting::Line { .. }))
    }

    /// Why a dequeued action can no longer resolve.
    pub(crate) fn orphan_reason(&self, action: &QueuedAction) -> Option<&'static str> {
        let unit_id = action.action.unit();
        let Some(unit) = self.unit(unit_id) else {
            return Some("unit no longer exists");
        };
        if unit.side != action.side {
            return Some("unit changed sides");
        }
        if !unit.is_on_board() {
            return Some("unit is off the board");
        }
        if let PlannedAction::PlayMove(play) = &action.action {
            if unit.move_slot(&play.move_id).is_none() {
                return Some("move no longer exists");
            }
        }
        None
    }

    pub(crate) fn skip_action(&mut self, action: &QueuedAction, reason: &str) {
        let name = match &action.action {
            PlannedAction::PlayMove(play) => play.move_id.clone(),
            PlannedAction::Guard(_) => "guard".to_string(),
        };
        tracing::debug!(unit = action.action.unit(), reason, "Action skipped");
        self.push_event(MatchEvent::ActionSkipped {
            unit: action.action.unit(),
            action: name,
            reason: reason.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{GuardOrder, MovePlay, PlanChoice};
    use crate::math::{Cell, Direction};
    use crate::rng::ScriptedRng;
    use crate::test_fixtures::duel;

    fn queued(priority: i32, sequence: u64) -> QueuedAction {
        QueuedAction {
            side: Side::Blue,
            priority,
            sequence,
            action: PlannedAction::PlayMove(MovePlay {
                unit: 1,
                move_id: format!("m{sequence}"),
                alternate: false,
            }),
        }
    }

    #[test]
    fn test_order_queue_priority_then_sequence() {
        let queue = order_queue(vec![queued(5, 0), queued(10, 1), queued(1, 2), queued(10, 3)]);
        let order: Vec<u64> = queue.iter().map(|a| a.sequence).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_guard_sorts_last() {
        let guard = QueuedAction {
            side: Side::Red,
            priority: GUARD_PRIORITY,
            sequence: 0,
            action: PlannedAction::Guard(GuardOrder {
                unit: 2,
                discard: ["a".into(), "b".into()],
            }),
        };
        let queue = order_queue(vec![guard, queued(-100, 1)]);
        assert_eq!(queue.back().map(|a| a.priority), Some(GUARD_PRIORITY));
    }

    #[test]
    fn test_orphaned_awaiting_action_is_skipped_on_resume() {
        let mut state = duel(
            &[("raichou", Cell::new(1, 4)), ("enshishi", Cell::new(1, 0))],
            &[("kidouba", Cell::new(3, 4))],
        );
        let mut rng = ScriptedRng::new(vec![0]);
        state.submit_plan(Side::Blue, 1, PlanChoice::card("thunderbolt")).unwrap();
        state.submit_plan(Side::Blue, 2, PlanChoice::card("flamethrower")).unwrap();
        state.confirm_plan(Side::Blue, &mut rng).unwrap();
        state.confirm_plan(Side::Red, &mut rng).unwrap();
        assert_eq!(state.current_resolving_action().map(|a| a.action.unit()), Some(1));

        let bytes = state.serialize().unwrap();
        let mut restored = MatchState::deserialize(&bytes).unwrap();
        restored.knock_out_unit(1, Side::Red);

        restored
            .supply_target(TargetSelection::none().at_unit(3), &mut rng)
            .unwrap();
        assert!(restored.log().entries().iter().any(|e| matches!(
            &e.event,
            MatchEvent::ActionSkipped { unit: 1, .. }
        )));
        assert!(restored.unit(3).unwrap().health.is_full());
        // Draining went on to the next queued action.
        assert_eq!(restored.current_resolving_action().map(|a| a.action.unit()), Some(2));
        assert!(restored.pending_actions().is_empty());

        restored
            .supply_target(TargetSelection::none().toward(Direction::South), &mut rng)
            .unwrap();
        assert_eq!(*restored.scheduler_status(), SchedulerStatus::Idle);
        assert_eq!(restored.phase(), Phase::Planning);
    }
}
