//! Public entry points that mutate a match.
//!
//! Every entry point validates its input first and returns
//! [`GameError::IllegalAction`] without touching the state when the rules
//! reject it. Once accepted, the call runs the match forward until a human
//! decision is needed again (see [`MatchState::advance`]).
//!
//! # Example
//!
//! ```
//! use skirmish_core::prelude::*;
//!
//! let setup = MatchSetup::standard(Controller::Ai, Controller::Ai);
//! let mut state = MatchState::new(&setup, &RosterData::standard()).unwrap();
//! let mut rng = seeded_rng(7);
//! while state.advance(&mut rng) {}
//! assert!(state.is_over());
//! ```

use crate::actions::{
    MovePlay, PlanChoice, PlanEntry, PlannedAction, SchedulerStatus, TargetSelection, UpgradeKind,
};
use crate::ai::{self, candidates::ALTERNATE_ALLOWANCE};
use crate::data::Targeting;
use crate::error::{GameError, IllegalAction, Result};
use crate::events::MatchEvent;
use crate::math::Cell;
use crate::rng::RandomSource;
use crate::side::Side;
use crate::state::{MatchState, Phase};
use crate::units::{UnitId, UnitInstance};

fn rejected(side: Option<Side>, reason: IllegalAction) -> GameError {
    tracing::warn!(side = ?side, "Rejected action: {reason}");
    reason.into()
}

impl MatchState {
    // ------------------------------------------------------------------
    // Planning
    // ------------------------------------------------------------------

    /// Add an action for `unit` to `side`'s plan.
    ///
    /// # Errors
    ///
    /// Rejects the call outside planning, for AI-controlled or confirmed
    /// sides, for units that cannot act, for moves on cooldown or beyond
    /// the side's resources, and for invalid guard discards.
    pub fn submit_plan(&mut self, side: Side, unit: UnitId, choice: PlanChoice) -> Result<()> {
        self.check_human_turn(side, Phase::Planning)
            .and_then(|()| self.check_unconfirmed_plan(side))
            .and_then(|()| self.check_choice(side, unit, &choice))
            .map_err(|reason| rejected(Some(side), reason))?;

        let sequence = self.next_sequence();
        self.plans[side.index()].entries.push(PlanEntry {
            sequence,
            action: PlannedAction::from_choice(unit, choice),
        });
        tracing::debug!(side = ?side, unit, sequence, "Plan submitted");
        Ok(())
    }

    /// Remove `unit`'s action from `side`'s plan.
    ///
    /// # Errors
    ///
    /// Rejects the call outside planning, after confirmation, or when the
    /// unit has nothing planned.
    pub fn cancel_plan(&mut self, side: Side, unit: UnitId) -> Result<()> {
        self.check_human_turn(side, Phase::Planning)
            .and_then(|()| self.check_unconfirmed_plan(side))
            .map_err(|reason| rejected(Some(side), reason))?;

        let entries = &mut self.plans[side.index()].entries;
        let Some(index) = entries.iter().position(|e| e.action.unit() == unit) else {
            return Err(rejected(Some(side), IllegalAction::NoPlannedAction(unit)));
        };
        entries.remove(index);
        Ok(())
    }

    /// Lock in `side`'s plan. Once every human side has confirmed, AI sides
    /// plan and resolution starts.
    ///
    /// # Errors
    ///
    /// Rejects the call outside planning or when already confirmed.
    pub fn confirm_plan(&mut self, side: Side, rng: &mut dyn RandomSource) -> Result<()> {
        self.check_human_turn(side, Phase::Planning)
            .and_then(|()| self.check_unconfirmed_plan(side))
            .map_err(|reason| rejected(Some(side), reason))?;

        self.plans[side.index()].confirmed = true;
        tracing::debug!(side = ?side, actions = self.plans[side.index()].entries.len(), "Plan confirmed");
        self.settle(rng);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Resolution input
    // ------------------------------------------------------------------

    /// Supply targets for the suspended action and resume resolution.
    ///
    /// # Errors
    ///
    /// Rejects the call when nothing is awaiting a target or when the
    /// selection cannot apply to the awaiting move. Unreachable
    /// destinations and targets out of range are not errors; those steps
    /// fizzle during resolution.
    pub fn supply_target(&mut self, selection: TargetSelection, rng: &mut dyn RandomSource) -> Result<()> {
        if self.is_over() {
            return Err(rejected(None, IllegalAction::MatchOver));
        }
        let Some(action) = self.status.awaiting().cloned() else {
            return Err(rejected(None, IllegalAction::NotAwaitingTarget));
        };

        let orphan = self.orphan_reason(&action);
        if let (None, PlannedAction::PlayMove(play)) = (orphan, &action.action) {
            self.check_selection(play, &selection)
                .map_err(|reason| rejected(Some(action.side), reason))?;
        }

        self.status = SchedulerStatus::Draining;
        match (orphan, &action.action) {
            (Some(reason), _) => self.skip_action(&action, reason),
            (None, PlannedAction::PlayMove(play)) => self.resolve_card(play, selection, rng),
            (None, PlannedAction::Guard(order)) => self.resolve_guard(order),
        }
        self.drain(rng);
        self.settle(rng);
        Ok(())
    }

    /// Drop the suspended action. Its card still goes on cooldown.
    ///
    /// # Errors
    ///
    /// Rejects the call when nothing is awaiting a target.
    pub fn skip_pending_action(&mut self, rng: &mut dyn RandomSource) -> Result<()> {
        if self.is_over() {
            return Err(rejected(None, IllegalAction::MatchOver));
        }
        let Some(action) = self.status.awaiting().cloned() else {
            return Err(rejected(None, IllegalAction::NotAwaitingTarget));
        };

        self.status = SchedulerStatus::Draining;
        if let PlannedAction::PlayMove(play) = &action.action {
            self.spend_card(play);
        }
        self.skip_action(&action, "skipped by player");
        self.drain(rng);
        self.settle(rng);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Deploy and upgrade
    // ------------------------------------------------------------------

    /// Place a benched unit during `side`'s deploy turn.
    ///
    /// # Errors
    ///
    /// Rejects the call outside the deploy phase, on the other side's turn,
    /// for units that are not benched, and for cells that break a placement
    /// rule.
    pub fn deploy_unit(&mut self, side: Side, unit: UnitId, cell: Cell) -> Result<()> {
        self.check_human_turn(side, Phase::Deploy)
            .and_then(|()| self.check_deploy(side, unit, cell))
            .map_err(|reason| rejected(Some(side), reason))?;

        self.place_unit(unit, cell);
        self.run_ai_deploys();
        Ok(())
    }

    /// Improve one move during the upgrade phase.
    ///
    /// # Errors
    ///
    /// Rejects the call outside the upgrade phase, after the side's upgrade
    /// or confirmation, and for moves the upgrade cannot improve.
    pub fn apply_upgrade(&mut self, side: Side, unit: UnitId, move_id: &str, kind: UpgradeKind) -> Result<()> {
        self.check_human_turn(side, Phase::Upgrade)
            .and_then(|()| self.check_upgrade(side, unit, move_id, kind))
            .map_err(|reason| rejected(Some(side), reason))?;

        self.upgrade_move(side, unit, move_id, kind);
        Ok(())
    }

    /// Finish `side`'s upgrade phase.
    ///
    /// # Errors
    ///
    /// Rejects the call outside the upgrade phase or when already confirmed.
    pub fn confirm_upgrade(&mut self, side: Side, rng: &mut dyn RandomSource) -> Result<()> {
        self.check_human_turn(side, Phase::Upgrade)
            .and_then(|()| {
                if self.upgrades[side.index()].confirmed {
                    Err(IllegalAction::AlreadyConfirmed(side))
                } else {
                    Ok(())
                }
            })
            .map_err(|reason| rejected(Some(side), reason))?;

        self.upgrades[side.index()].confirmed = true;
        self.settle(rng);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Progress
    // ------------------------------------------------------------------

    /// Make one step of progress that needs no human input.
    ///
    /// Takes an AI deploy turn, runs AI planning and resolution once every
    /// human has confirmed, resumes an interrupted drain, or finishes an AI
    /// upgrade. Returns `false` when the match is over or waiting on a
    /// human.
    pub fn advance(&mut self, rng: &mut dyn RandomSource) -> bool {
        if self.is_over() {
            return false;
        }
        match self.phase {
            Phase::Deploy => self.ai_deploy_step(),
            Phase::Planning => {
                let waiting = Side::ALL
                    .into_iter()
                    .any(|side| self.controller(side).is_human() && !self.plans[side.index()].confirmed);
                if waiting {
                    return false;
                }
                for side in Side::ALL {
                    if !self.controller(side).is_human() {
                        self.plan_for_ai(side);
                    }
                }
                self.begin_resolution(rng);
                true
            }
            Phase::Resolution => {
                if self.status.awaiting().is_some() {
                    return false;
                }
                self.drain(rng);
                true
            }
            Phase::Upgrade => {
                let pending_ai = Side::ALL.into_iter().find(|side| {
                    !self.controller(*side).is_human() && !self.upgrades[side.index()].confirmed
                });
                if let Some(side) = pending_ai {
                    if let Some((unit, move_id, kind)) = ai::choose_upgrade(self, side) {
                        self.upgrade_move(side, unit, &move_id, kind);
                    }
                    self.upgrades[side.index()].confirmed = true;
                    return true;
                }
                if self.upgrades.iter().all(|u| u.confirmed) {
                    self.enter_deploy_or_planning();
                    self.run_ai_deploys();
                    return true;
                }
                false
            }
        }
    }

    fn settle(&mut self, rng: &mut dyn RandomSource) {
        while self.advance(rng) {}
    }

    fn plan_for_ai(&mut self, side: Side) {
        for (unit, choice) in ai::choose_cycle_actions(self, side) {
            if let Err(reason) = self.check_choice(side, unit, &choice) {
                tracing::warn!(side = ?side, unit, "AI choice dropped: {reason}");
                continue;
            }
            let sequence = self.next_sequence();
            self.plans[side.index()].entries.push(PlanEntry {
                sequence,
                action: PlannedAction::from_choice(unit, choice),
            });
        }
        self.plans[side.index()].confirmed = true;
    }

    fn upgrade_move(&mut self, side: Side, unit: UnitId, move_id: &str, kind: UpgradeKind) {
        let power_bonus = self.rules.upgrade_power_bonus;
        let allowance_bonus = self.rules.upgrade_allowance_bonus;
        let Some(instance) = self.unit_mut(unit) else {
            return;
        };
        let Some(slot) = instance.move_slot_mut(move_id) else {
            return;
        };
        match kind {
            UpgradeKind::Power => slot.bonus_power = slot.bonus_power.saturating_add(power_bonus),
            UpgradeKind::Allowance => {
                slot.bonus_allowance = slot.bonus_allowance.saturating_add(allowance_bonus);
            }
        }
        let move_name = slot.data.name.clone();
        let event = MatchEvent::Upgraded {
            unit: instance.label(),
            move_name,
            kind,
        };
        self.upgrades[side.index()].applied = true;
        self.push_event(event);
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    fn check_human_turn(&self, side: Side, phase: Phase) -> std::result::Result<(), IllegalAction> {
        if self.is_over() {
            return Err(IllegalAction::MatchOver);
        }
        if self.phase != phase {
            return Err(IllegalAction::WrongPhase {
                expected: phase,
                actual: self.phase,
            });
        }
        if !self.controller(side).is_human() {
            return Err(IllegalAction::NotHumanControlled(side));
        }
        Ok(())
    }

    fn check_unconfirmed_plan(&self, side: Side) -> std::result::Result<(), IllegalAction> {
        if self.plans[side.index()].confirmed {
            return Err(IllegalAction::AlreadyConfirmed(side));
        }
        Ok(())
    }

    fn owned_unit(&self, side: Side, unit: UnitId) -> std::result::Result<&UnitInstance, IllegalAction> {
        let instance = self.unit(unit).ok_or(IllegalAction::UnknownUnit(unit))?;
        if instance.side != side {
            return Err(IllegalAction::NotOwned { unit, side });
        }
        Ok(instance)
    }

    fn check_choice(&self, side: Side, unit: UnitId, choice: &PlanChoice) -> std::result::Result<(), IllegalAction> {
        let instance = self.owned_unit(side, unit)?;
        if !instance.is_on_board() {
            return Err(IllegalAction::NotOnBoard(unit));
        }
        if instance.is_paralyzed(self.cycle) {
            return Err(IllegalAction::Paralyzed(unit));
        }
        let plan = &self.plans[side.index()];
        if plan.has_unit(unit) {
            return Err(IllegalAction::AlreadyActed(unit));
        }
        if plan.is_full() {
            return Err(IllegalAction::PlanFull(side));
        }

        match choice {
            PlanChoice::Card { move_id, alternate } => {
                let slot = instance
                    .move_slot(move_id)
                    .ok_or_else(|| IllegalAction::UnknownMove {
                        unit,
                        move_id: move_id.clone(),
                    })?;
                if !slot.is_ready() {
                    return Err(IllegalAction::MoveOnCooldown {
                        move_id: move_id.clone(),
                        remaining: slot.cooldown_remaining,
                    });
                }
                if !alternate {
                    let total = self.planned_cost(side).plus(instance.price_of(slot));
                    if !self.stockpile(side).can_afford(total) {
                        return Err(IllegalAction::CannotAfford(move_id.clone()));
                    }
                }
            }
            PlanChoice::Guard { discard } => {
                let ready = |id: &String| instance.move_slot(id).is_some_and(|s| s.is_ready());
                if discard[0] == discard[1] || !discard.iter().all(ready) {
                    return Err(IllegalAction::InvalidGuardDiscard);
                }
            }
        }
        Ok(())
    }

    fn check_selection(&self, play: &MovePlay, selection: &TargetSelection) -> std::result::Result<(), IllegalAction> {
        let malformed = |text: &str| Err(IllegalAction::MalformedTarget(text.to_string()));
        let instance = self.unit(play.unit).ok_or(IllegalAction::UnknownUnit(play.unit))?;
        let slot = instance
            .move_slot(&play.move_id)
            .ok_or_else(|| IllegalAction::UnknownMove {
                unit: play.unit,
                move_id: play.move_id.clone(),
            })?;

        if selection.target_unit.is_some() && selection.target_block.is_some() {
            return malformed("choose a unit or a block, not both");
        }
        if play.alternate {
            if selection.target_unit.is_some()
                || selection.target_block.is_some()
                || selection.direction.is_some()
            {
                return malformed("alternate plays only take a destination");
            }
            if let (Some(destination), Some(origin)) = (selection.destination, instance.position) {
                let distance = origin.manhattan(destination);
                if !origin.is_aligned(destination) || distance == 0 || distance > ALTERNATE_ALLOWANCE {
                    return malformed("alternate moves go one or two cells in a straight line");
                }
            }
        } else if selection.destination.is_some() && slot.allowance() == 0 {
            return malformed("move does not relocate the unit");
        }
        if selection.destination.is_some_and(|cell| !self.territory.in_bounds(cell)) {
            return malformed("destination is off the board");
        }

        let single = matches!(slot.data.targeting, Targeting::Single);
        if let Some(target) = selection.target_unit {
            if !single {
                return malformed("move does not take a unit target");
            }
            let other = self.unit(target).ok_or(IllegalAction::UnknownUnit(target))?;
            if other.side == instance.side {
                return malformed("cannot target an ally");
            }
        }
        if let Some(block) = selection.target_block {
            if !single {
                return malformed("move does not take a block target");
            }
            self.block(block).ok_or(IllegalAction::UnknownBlock(block))?;
        }
        if selection.direction.is_some() && !matches!(slot.data.targeting, Targeting::Line { .. }) {
            return malformed("move does not take a direction");
        }
        Ok(())
    }

    fn check_deploy(&self, side: Side, unit: UnitId, cell: Cell) -> std::result::Result<(), IllegalAction> {
        if self.deploy_turn != Some(side) {
            return Err(IllegalAction::NotYourDeployTurn(side));
        }
        let instance = self.owned_unit(side, unit)?;
        if !instance.is_benched() || self.on_board(side).count() >= self.rules.units_on_field {
            return Err(IllegalAction::NotDeployable(unit));
        }
        if let Some(reason) = self.deploy_cell_error(cell) {
            return Err(IllegalAction::InvalidDeployCell { cell, reason });
        }
        Ok(())
    }

    fn check_upgrade(
        &self,
        side: Side,
        unit: UnitId,
        move_id: &str,
        kind: UpgradeKind,
    ) -> std::result::Result<(), IllegalAction> {
        let status = &self.upgrades[side.index()];
        if status.confirmed {
            return Err(IllegalAction::AlreadyConfirmed(side));
        }
        if status.applied {
            return Err(IllegalAction::AlreadyUpgraded(side));
        }
        let instance = self.owned_unit(side, unit)?;
        let slot = instance
            .move_slot(move_id)
            .ok_or_else(|| IllegalAction::UnknownMove {
                unit,
                move_id: move_id.to_string(),
            })?;
        let applicable = match kind {
            UpgradeKind::Power => slot.data.power > 0,
            UpgradeKind::Allowance => slot.data.allowance > 0,
        };
        if !applicable {
            return Err(IllegalAction::UpgradeNotApplicable(move_id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;
    use crate::test_fixtures::duel;

    fn rng() -> ScriptedRng {
        ScriptedRng::new(vec![99])
    }

    #[test]
    fn test_submit_rejections_leave_state_alone() {
        let mut state = duel(&[("raichou", Cell::new(1, 4))], &[("kidouba", Cell::new(7, 4))]);
        let before = state.state_hash();

        let cases = [
            (Side::Red, 1, PlanChoice::card("thunderbolt")),
            (Side::Blue, 9, PlanChoice::card("thunderbolt")),
            (Side::Blue, 1, PlanChoice::card("hyper-beam")),
            (Side::Blue, 1, PlanChoice::guard("thunder", "thunder")),
        ];
        for (side, unit, choice) in cases {
            let err = state.submit_plan(side, unit, choice).unwrap_err();
            assert!(err.is_illegal_action());
        }
        assert_eq!(state.state_hash(), before);
    }

    #[test]
    fn test_already_acted_and_cooldown() {
        let mut state = duel(&[("raichou", Cell::new(1, 4))], &[("kidouba", Cell::new(7, 4))]);
        state.submit_plan(Side::Blue, 1, PlanChoice::card("thunderbolt")).unwrap();
        assert_eq!(
            state.submit_plan(Side::Blue, 1, PlanChoice::card("thunder")),
            Err(GameError::IllegalAction(IllegalAction::AlreadyActed(1)))
        );
        state.cancel_plan(Side::Blue, 1).unwrap();
        state.unit_mut(1).unwrap().move_slot_mut("thunder").unwrap().cooldown_remaining = 2;
        assert!(matches!(
            state.submit_plan(Side::Blue, 1, PlanChoice::card("thunder")),
            Err(GameError::IllegalAction(IllegalAction::MoveOnCooldown { remaining: 2, .. }))
        ));
    }

    #[test]
    fn test_affordability_counts_planned_costs() {
        let mut state = duel(
            &[("kidouba", Cell::new(1, 4)), ("enshishi", Cell::new(1, 0))],
            &[("raichou", Cell::new(7, 4))],
        );
        state.stockpiles[0].wood = 1;
        state.unit_mut(1).unwrap().used_moves.insert("gallop".into());
        state.unit_mut(2).unwrap().used_moves.insert("flamethrower".into());

        state.submit_plan(Side::Blue, 1, PlanChoice::card("gallop")).unwrap();
        assert_eq!(
            state.submit_plan(Side::Blue, 2, PlanChoice::card("flamethrower")),
            Err(GameError::IllegalAction(IllegalAction::CannotAfford("flamethrower".into())))
        );
        // Alternate plays are free.
        state.submit_plan(Side::Blue, 2, PlanChoice::alternate("flamethrower")).unwrap();
    }

    #[test]
    fn test_confirm_suspends_on_human_target() {
        let mut state = duel(&[("raichou", Cell::new(1, 4))], &[("kidouba", Cell::new(3, 4))]);
        state.submit_plan(Side::Blue, 1, PlanChoice::card("thunderbolt")).unwrap();
        state.confirm_plan(Side::Blue, &mut rng()).unwrap();
        assert_eq!(state.phase(), Phase::Planning);
        state.confirm_plan(Side::Red, &mut rng()).unwrap();

        assert_eq!(state.phase(), Phase::Resolution);
        let awaiting = state.current_resolving_action().unwrap();
        assert_eq!(awaiting.action.unit(), 1);

        let err = state
            .supply_target(TargetSelection::none().toward(crate::math::Direction::East), &mut rng())
            .unwrap_err();
        assert!(matches!(err, GameError::IllegalAction(IllegalAction::MalformedTarget(_))));
        assert!(state.current_resolving_action().is_some());

        state.supply_target(TargetSelection::none().at_unit(2), &mut rng()).unwrap();
        assert!(state.current_resolving_action().is_none());
        assert!(!state.unit(2).unwrap().health.is_full());
        assert_eq!(state.phase(), Phase::Planning);
        assert_eq!(state.cycle(), 2);
    }

    #[test]
    fn test_skip_spends_the_card() {
        let mut state = duel(&[("raichou", Cell::new(1, 4))], &[("kidouba", Cell::new(3, 4))]);
        state.submit_plan(Side::Blue, 1, PlanChoice::card("thunderbolt")).unwrap();
        state.confirm_plan(Side::Blue, &mut rng()).unwrap();
        state.confirm_plan(Side::Red, &mut rng()).unwrap();
        state.skip_pending_action(&mut rng()).unwrap();
        assert!(state.unit(2).unwrap().health.is_full());
        assert!(!state.unit(1).unwrap().move_slot("thunderbolt").unwrap().is_ready());
        assert_eq!(
            state.skip_pending_action(&mut rng()),
            Err(GameError::IllegalAction(IllegalAction::NotAwaitingTarget))
        );
    }

    #[test]
    fn test_wrong_phase_deploy() {
        let mut state = duel(&[("raichou", Cell::new(1, 4))], &[("kidouba", Cell::new(7, 4))]);
        assert_eq!(
            state.deploy_unit(Side::Blue, 1, Cell::new(0, 0)),
            Err(GameError::IllegalAction(IllegalAction::WrongPhase {
                expected: Phase::Deploy,
                actual: Phase::Planning,
            }))
        );
    }

    #[test]
    fn test_upgrade_flow() {
        let mut state = duel(&[("raichou", Cell::new(1, 4))], &[("kidouba", Cell::new(7, 4))]);
        state.enter_upgrade();
        assert!(matches!(
            state.apply_upgrade(Side::Blue, 1, "swap", UpgradeKind::Power),
            Err(GameError::IllegalAction(IllegalAction::UpgradeNotApplicable(_)))
        ));
        state.apply_upgrade(Side::Blue, 1, "thunder", UpgradeKind::Power).unwrap();
        assert_eq!(state.unit(1).unwrap().move_slot("thunder").unwrap().power(), 120);
        assert_eq!(
            state.apply_upgrade(Side::Blue, 1, "thunderbolt", UpgradeKind::Power),
            Err(GameError::IllegalAction(IllegalAction::AlreadyUpgraded(Side::Blue)))
        );
        state.confirm_upgrade(Side::Blue, &mut rng()).unwrap();
        assert_eq!(state.phase(), Phase::Upgrade);
        state.confirm_upgrade(Side::Red, &mut rng()).unwrap();
        assert_eq!(state.phase(), Phase::Planning);
    }
}
