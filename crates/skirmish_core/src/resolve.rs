//! Resolution of a single dequeued action.
//!
//! A card play runs its steps in a fixed order: payment, element shift,
//! movement, combat, recoil, swap, and finally the card goes on cooldown.
//! A missing or invalid target is never an error here; the affected step
//! fizzles and the rest of the play continues.

use crate::actions::{GuardOrder, MovePlay, TargetSelection};
use crate::ai::candidates::ALTERNATE_ALLOWANCE;
use crate::blocks::BlockId;
use crate::combat::{compute_damage, guarded, multi_hit, Effectiveness, Element};
use crate::data::{MoveEffect, Targeting};
use crate::events::MatchEvent;
use crate::math::Cell;
use crate::pathfinding::move_cost;
use crate::rng::RandomSource;
use crate::side::Side;
use crate::state::{MatchOutcome, MatchState};
use crate::units::{MoveSlot, StatusCondition, UnitId, BURN_CYCLES};

/// What an attack connected with.
#[derive(Debug, Clone, Copy, Default)]
struct StrikeResult {
    /// Damage dealt to units, after guard and hit count.
    dealt: u32,
    /// Whether anything at all was hit.
    landed: bool,
}

impl MatchState {
    pub(crate) fn resolve_guard(&mut self, order: &GuardOrder) {
        let cycle = self.cycle;
        let Some(unit) = self.unit_mut(order.unit) else {
            return;
        };
        unit.guard_through = Some(cycle + 1);
        for move_id in &order.discard {
            if let Some(slot) = unit.move_slot_mut(move_id) {
                slot.spend();
            }
        }
        let label = unit.label();
        self.push_event(MatchEvent::GuardRaised {
            unit: label,
            discarded: order.discard.clone(),
        });
    }

    pub(crate) fn resolve_card(
        &mut self,
        play: &MovePlay,
        selection: TargetSelection,
        rng: &mut dyn RandomSource,
    ) {
        let Some(unit) = self.unit(play.unit) else {
            return;
        };
        let Some(slot) = unit.move_slot(&play.move_id).cloned() else {
            return;
        };
        let side = unit.side;
        let price = unit.price_of(&slot);
        let current_element = unit.element;
        let event = MatchEvent::MoveUsed {
            unit: unit.label(),
            move_name: slot.data.name.clone(),
            alternate: play.alternate,
        };
        self.push_event(event);

        if play.alternate {
            self.resolve_alternate(play.unit, &slot, selection.destination);
            self.spend_card(play);
            return;
        }

        if !self.stockpiles[side.index()].pay(price) {
            self.fizzle(play.unit, &slot, "cannot pay the resource cost");
            self.spend_card(play);
            return;
        }
        if let Some(unit) = self.unit_mut(play.unit) {
            unit.used_moves.insert(play.move_id.clone());
        }

        if self.is_element_shifter(play.unit)
            && slot.data.element != Element::Normal
            && slot.data.element != current_element
        {
            if let Some(unit) = self.unit_mut(play.unit) {
                unit.element = slot.data.element;
                let event = MatchEvent::ElementShifted {
                    unit: unit.label(),
                    element: slot.data.element,
                };
                self.push_event(event);
            }
        }

        if slot.allowance() > 0 {
            match selection.destination {
                Some(destination) => {
                    let here = self.unit(play.unit).and_then(|u| u.position);
                    if here != Some(destination) {
                        self.try_move(play.unit, destination, slot.allowance());
                    }
                }
                None if !slot.is_damaging() && !slot.data.swaps() => {
                    self.fizzle(play.unit, &slot, "no destination");
                }
                None => {}
            }
        }

        let mut strike = StrikeResult::default();
        if !self.is_over() && slot.is_damaging() {
            strike = self.strike(play.unit, &slot, selection, rng);
        }

        if matches!(slot.data.effect, Some(MoveEffect::Recoil)) && strike.dealt > 0 {
            self.apply_recoil(play.unit, strike.dealt / 3);
        }

        let still_here = self.unit(play.unit).is_some_and(|u| u.is_on_board());
        if !self.is_over()
            && slot.data.swaps()
            && still_here
            && (slot.power() == 0 || strike.landed)
        {
            self.swap_out(play.unit, &slot);
        }

        self.spend_card(play);
    }

    fn resolve_alternate(&mut self, id: UnitId, slot: &MoveSlot, destination: Option<Cell>) {
        let Some(destination) = destination else {
            self.fizzle(id, slot, "no destination");
            return;
        };
        let Some(origin) = self.unit(id).and_then(|u| u.position) else {
            return;
        };
        let straight = origin != destination
            && origin.is_aligned(destination)
            && origin.manhattan(destination) <= ALTERNATE_ALLOWANCE;
        if straight {
            self.try_move(id, destination, ALTERNATE_ALLOWANCE);
        } else {
            self.block_move(id, destination);
        }
    }

    pub(crate) fn spend_card(&mut self, play: &MovePlay) {
        if let Some(slot) = self
            .unit_mut(play.unit)
            .and_then(|u| u.move_slot_mut(&play.move_id))
        {
            slot.spend();
        }
    }

    fn fizzle(&mut self, id: UnitId, slot: &MoveSlot, reason: &str) {
        let Some(unit) = self.unit(id) else {
            return;
        };
        let event = MatchEvent::Fizzled {
            unit: unit.label(),
            move_name: slot.data.name.clone(),
            reason: reason.to_string(),
        };
        self.push_event(event);
    }

    /// Move a unit if `destination` is free and within `allowance`.
    ///
    /// The path is painted for the unit's side. An unreachable destination
    /// logs [`MatchEvent::MoveBlocked`] and leaves the unit in place.
    pub(crate) fn try_move(&mut self, id: UnitId, destination: Cell, allowance: u32) -> bool {
        let Some(unit) = self.unit(id) else {
            return false;
        };
        let Some(from) = unit.position else {
            return false;
        };
        let side = unit.side;

        let free = self.territory.in_bounds(destination)
            && !self.occupied_cells(Some(id)).contains(&destination);
        let cost = free
            .then(|| move_cost(&self.territory, from, destination, side))
            .flatten()
            .filter(|cost| *cost <= allowance);
        let Some(cost) = cost else {
            self.block_move(id, destination);
            return false;
        };

        self.territory.paint_line(from, destination, side);
        let Some(unit) = self.unit_mut(id) else {
            return false;
        };
        unit.position = Some(destination);
        let event = MatchEvent::Moved {
            unit: unit.label(),
            from,
            to: destination,
            cost,
        };
        self.push_event(event);
        true
    }

    fn block_move(&mut self, id: UnitId, destination: Cell) {
        if let Some(unit) = self.unit(id) {
            let event = MatchEvent::MoveBlocked {
                unit: unit.label(),
                destination,
            };
            self.push_event(event);
        }
    }

    fn strike(
        &mut self,
        attacker: UnitId,
        slot: &MoveSlot,
        selection: TargetSelection,
        rng: &mut dyn RandomSource,
    ) -> StrikeResult {
        let Some(unit) = self.unit(attacker) else {
            return StrikeResult::default();
        };
        let Some(from) = unit.position else {
            return StrikeResult::default();
        };
        let enemy = unit.side.opponent();

        let (victims, blocks, miss_reason): (Vec<UnitId>, Vec<BlockId>, &str) =
            match slot.data.targeting {
                Targeting::Single => {
                    let range = slot.attack_range();
                    let unit_target = selection.target_unit.filter(|id| {
                        self.unit(*id).is_some_and(|t| {
                            t.side == enemy && t.position.is_some_and(|c| from.manhattan(c) <= range)
                        })
                    });
                    let block_target = selection
                        .target_block
                        .filter(|id| self.block(*id).is_some_and(|b| from.manhattan(b.cell) <= range));
                    match (unit_target, block_target) {
                        (Some(id), _) => (vec![id], Vec::new(), ""),
                        (None, Some(id)) => (Vec::new(), vec![id], ""),
                        (None, None) => (Vec::new(), Vec::new(), "no target in range"),
                    }
                }
                Targeting::Line { reach } => match selection.direction {
                    None => (Vec::new(), Vec::new(), "no direction"),
                    Some(direction) => {
                        let mut victims = Vec::new();
                        let mut blocks = Vec::new();
                        for cell in from.ray(direction, reach) {
                            if !self.territory.in_bounds(cell) {
                                break;
                            }
                            if let Some(block) = self.block_at(cell) {
                                blocks.push(block.id);
                                break;
                            }
                            if let Some(other) = self.unit_at(cell) {
                                if other.side == enemy {
                                    victims.push(other.id);
                                }
                            }
                        }
                        (victims, blocks, "nothing in the line")
                    }
                },
                Targeting::Surrounding => {
                    let victims = self
                        .on_board(enemy)
                        .filter(|t| t.position.is_some_and(|c| from.chebyshev(c) == 1))
                        .map(|t| t.id)
                        .collect();
                    let blocks = self
                        .blocks()
                        .filter(|b| from.chebyshev(b.cell) == 1)
                        .map(|b| b.id)
                        .collect();
                    (victims, blocks, "nothing adjacent")
                }
                Targeting::SelfOnly => (Vec::new(), Vec::new(), ""),
            };

        if victims.is_empty() && blocks.is_empty() {
            self.fizzle(attacker, slot, miss_reason);
            return StrikeResult::default();
        }

        let mut result = StrikeResult {
            dealt: 0,
            landed: true,
        };
        for target in victims {
            if self.is_over() {
                return result;
            }
            result.dealt += self.hit_unit(attacker, target, slot, rng);
        }
        for block in blocks {
            self.chip_block(block);
        }
        result
    }

    /// Deal one attack's damage to `target` and apply its effects.
    ///
    /// Returns the damage dealt.
    fn hit_unit(
        &mut self,
        attacker: UnitId,
        target: UnitId,
        slot: &MoveSlot,
        rng: &mut dyn RandomSource,
    ) -> u32 {
        let cycle = self.cycle;
        let (Some(source), Some(victim)) = (self.unit(attacker), self.unit(target)) else {
            return 0;
        };
        let attacker_label = source.label();
        let attacker_side = source.side;
        let roll = compute_damage(slot.power(), slot.data.element, source.element, victim.element);
        let is_guarding = victim.is_guarding(cycle);

        let mut amount = roll.amount;
        let mut hits = 1;
        if let Some(MoveEffect::MultiHit { min_hits, max_hits }) = slot.data.effect {
            hits = rng.roll_range(min_hits, max_hits);
            amount = multi_hit(amount, hits);
        }
        if is_guarding {
            amount = guarded(amount);
        }

        let Some(victim) = self.unit_mut(target) else {
            return 0;
        };
        victim.health.apply_damage(amount);
        let depleted = victim.health.is_depleted();
        let event = MatchEvent::Damaged {
            attacker: attacker_label,
            target: victim.label(),
            amount,
            effectiveness: roll.effectiveness,
            hits,
            guarded: is_guarding,
        };
        self.push_event(event);

        if depleted {
            self.knock_out_unit(target, attacker_side);
        } else if roll.effectiveness != Effectiveness::Immune {
            self.apply_secondary(attacker, target, slot, rng);
        }
        amount
    }

    fn apply_secondary(
        &mut self,
        attacker: UnitId,
        target: UnitId,
        slot: &MoveSlot,
        rng: &mut dyn RandomSource,
    ) {
        let cycle = self.cycle;
        match slot.data.effect {
            Some(MoveEffect::Flinch { chance }) => {
                if !rng.roll_percent(chance) {
                    return;
                }
                let before = self.queue.len();
                self.queue.retain(|queued| queued.action.unit() != target);
                if self.queue.len() < before {
                    if let Some(unit) = self.unit(target) {
                        let event = MatchEvent::Flinched { unit: unit.label() };
                        self.push_event(event);
                    }
                }
            }
            Some(MoveEffect::Paralyze { chance }) => {
                let status = StatusCondition::Paralyzed {
                    through_cycle: cycle + 1,
                };
                self.try_apply_status(target, status, chance, rng);
            }
            Some(MoveEffect::Burn { chance }) => {
                let status = StatusCondition::Burned {
                    cycles_left: BURN_CYCLES,
                };
                self.try_apply_status(target, status, chance, rng);
            }
            Some(MoveEffect::Knockback { chance }) => {
                if rng.roll_percent(chance) {
                    self.knock_back(attacker, target);
                }
            }
            Some(MoveEffect::MultiHit { .. } | MoveEffect::Recoil | MoveEffect::Swap) | None => {}
        }
    }

    fn try_apply_status(
        &mut self,
        target: UnitId,
        status: StatusCondition,
        chance: u32,
        rng: &mut dyn RandomSource,
    ) {
        let hit = rng.roll_percent(chance);
        let Some(unit) = self.unit_mut(target) else {
            return;
        };
        if !hit || unit.status.is_some() {
            return;
        }
        unit.status = Some(status);
        let event = MatchEvent::StatusApplied {
            unit: unit.label(),
            status,
        };
        self.push_event(event);
    }

    fn knock_back(&mut self, attacker: UnitId, target: UnitId) {
        let (Some(from), Some(at)) = (
            self.unit(attacker).and_then(|u| u.position),
            self.unit(target).and_then(|u| u.position),
        ) else {
            return;
        };
        let to = at.offset((at.x - from.x).signum(), (at.y - from.y).signum());
        if to == at || !self.territory.in_bounds(to) || self.occupied_cells(None).contains(&to) {
            return;
        }
        if let Some(unit) = self.unit_mut(target) {
            unit.position = Some(to);
            let event = MatchEvent::KnockedBack {
                unit: unit.label(),
                to,
            };
            self.push_event(event);
        }
    }

    fn apply_recoil(&mut self, id: UnitId, amount: u32) {
        if amount == 0 {
            return;
        }
        let Some(unit) = self.unit_mut(id) else {
            return;
        };
        if !unit.is_on_board() {
            return;
        }
        unit.health.apply_damage(amount);
        let depleted = unit.health.is_depleted();
        let side = unit.side;
        let event = MatchEvent::Recoil {
            unit: unit.label(),
            amount,
        };
        self.push_event(event);
        if depleted {
            self.knock_out_unit(id, side.opponent());
        }
    }

    fn swap_out(&mut self, id: UnitId, slot: &MoveSlot) {
        let Some(outgoing) = self.unit(id) else {
            return;
        };
        let Some(cell) = outgoing.position else {
            return;
        };
        let side = outgoing.side;
        let Some(incoming) = self.units_of(side).find(|u| u.is_benched()).map(|u| u.id) else {
            self.fizzle(id, slot, "no benched ally");
            return;
        };

        let mut outgoing_label = None;
        if let Some(unit) = self.unit_mut(id) {
            unit.position = None;
            outgoing_label = Some(unit.label());
        }
        if let (Some(outgoing), Some(unit)) = (outgoing_label, self.unit_mut(incoming)) {
            unit.position = Some(cell);
            let event = MatchEvent::Swapped {
                outgoing,
                incoming: unit.label(),
                cell,
            };
            self.push_event(event);
        }
    }

    fn chip_block(&mut self, id: BlockId) {
        let Some(block) = self.blocks.get_mut(&id) else {
            return;
        };
        let broke = block.chip();
        let cell = block.cell;
        let remaining = block.integrity;
        if broke {
            self.blocks.remove(&id);
            self.push_event(MatchEvent::BlockDestroyed { block: id, cell });
        } else {
            self.push_event(MatchEvent::BlockChipped {
                block: id,
                cell,
                remaining,
            });
        }
    }

    /// Remove a unit from the board and credit the kill.
    pub(crate) fn knock_out_unit(&mut self, id: UnitId, credited: Side) {
        let Some(unit) = self.unit_mut(id) else {
            return;
        };
        unit.knock_out();
        let label = unit.label();
        let bonus = self.rules.kill_bonus;
        self.banked[credited.index()] += bonus;
        tracing::debug!(unit = id, credited = ?credited, "Unit knocked out");
        self.push_event(MatchEvent::KnockedOut {
            unit: label,
            credited,
            bonus,
        });
        self.check_threshold(credited);
    }

    /// End the match if `side` has reached the victory score.
    pub(crate) fn check_threshold(&mut self, side: Side) {
        if self.is_over() || self.score(side) < self.rules.victory_score {
            return;
        }
        self.finish(MatchOutcome::Winner(side));
    }

    pub(crate) fn finish(&mut self, outcome: MatchOutcome) {
        self.outcome = Some(outcome);
        tracing::info!(
            cycle = self.cycle,
            blue = self.score(Side::Blue),
            red = self.score(Side::Red),
            "Match ended: {outcome}"
        );
        self.push_event(MatchEvent::MatchEnded { outcome });
    }
}
