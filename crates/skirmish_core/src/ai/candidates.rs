//! Enumeration of legal action candidates for one unit.

use crate::actions::{PlanChoice, TargetSelection};
use crate::data::Targeting;
use crate::math::{Cell, Direction};
use crate::pathfinding::{move_cost, reachable_set};
use crate::state::MatchState;
use crate::units::{MoveSlot, UnitId, UnitInstance};

/// Allowance of a card played as a reposition.
pub const ALTERNATE_ALLOWANCE: u32 = 2;

/// What a candidate would have the unit do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateAction {
    /// Play a move with these targets.
    Card {
        /// Move to play.
        move_id: String,
        /// Played as a reposition.
        alternate: bool,
        /// Targets the move would use.
        selection: TargetSelection,
    },
    /// Guard, discarding two moves.
    Guard {
        /// Moves put on cooldown.
        discard: [String; 2],
    },
}

/// One option the decision engine may pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Acting unit.
    pub unit: UnitId,
    /// The option.
    pub action: CandidateAction,
    /// Enemy the attack is aimed at, for scoring.
    pub focus: Option<UnitId>,
}

impl Candidate {
    /// Destination of the candidate, if it moves the unit.
    #[must_use]
    pub fn destination(&self) -> Option<Cell> {
        match &self.action {
            CandidateAction::Card { selection, .. } => selection.destination,
            CandidateAction::Guard { .. } => None,
        }
    }

    /// The planning choice this candidate corresponds to.
    #[must_use]
    pub fn to_choice(&self) -> PlanChoice {
        match &self.action {
            CandidateAction::Card {
                move_id, alternate, ..
            } => PlanChoice::Card {
                move_id: move_id.clone(),
                alternate: *alternate,
            },
            CandidateAction::Guard { discard } => PlanChoice::Guard {
                discard: discard.clone(),
            },
        }
    }

    fn card(unit: UnitId, slot: &MoveSlot, selection: TargetSelection, focus: Option<UnitId>) -> Self {
        Self {
            unit,
            action: CandidateAction::Card {
                move_id: slot.id().to_string(),
                alternate: false,
                selection,
            },
            focus,
        }
    }
}

/// Whether the decision engine considers playing this move at all.
///
/// Pure swap moves are never chosen on their own.
#[must_use]
pub fn is_considered(slot: &MoveSlot) -> bool {
    slot.is_ready() && !(slot.power() == 0 && slot.data.swaps())
}

/// Every candidate for `unit` in a fixed generation order.
///
/// Off-board units produce nothing.
#[must_use]
pub fn generate(state: &MatchState, unit: &UnitInstance) -> Vec<Candidate> {
    let Some(origin) = unit.position else {
        return Vec::new();
    };
    let occupied = state.occupied_cells(Some(unit.id));
    let mut candidates = Vec::new();

    for slot in unit.moves.iter().filter(|s| is_considered(s)) {
        let destinations: Vec<Option<Cell>> = if slot.allowance() > 0 {
            reachable_set(state.territory(), origin, slot.allowance(), unit.side, &occupied)
                .into_iter()
                .map(|r| (r.cell != origin).then_some(r.cell))
                .collect()
        } else {
            vec![None]
        };

        let mut found_target = false;
        for destination in destinations {
            let from = destination.unwrap_or(origin);
            let base = TargetSelection {
                destination,
                ..TargetSelection::none()
            };
            let before = candidates.len();
            attack_candidates(state, unit, slot, from, base, &mut candidates);
            found_target |= candidates.len() > before;

            if destination.is_some() {
                candidates.push(Candidate::card(unit.id, slot, base, None));
            }
        }

        // Cards with nothing to hit can still be spent in place.
        if !found_target && slot.allowance() == 0 {
            candidates.push(Candidate::card(unit.id, slot, TargetSelection::none(), None));
        }

        for direction in Direction::ALL {
            for steps in 1..=ALTERNATE_ALLOWANCE as i32 {
                let cell = origin.step(direction, steps);
                if !state.territory().in_bounds(cell) || occupied.contains(&cell) {
                    continue;
                }
                let affordable = move_cost(state.territory(), origin, cell, unit.side)
                    .is_some_and(|cost| cost <= ALTERNATE_ALLOWANCE);
                if affordable {
                    candidates.push(Candidate {
                        unit: unit.id,
                        action: CandidateAction::Card {
                            move_id: slot.id().to_string(),
                            alternate: true,
                            selection: TargetSelection::none().to_cell(cell),
                        },
                        focus: None,
                    });
                }
            }
        }
    }

    let ready: Vec<&MoveSlot> = unit.moves.iter().filter(|s| s.is_ready()).collect();
    if let [first, second, ..] = ready.as_slice() {
        candidates.push(Candidate {
            unit: unit.id,
            action: CandidateAction::Guard {
                discard: [first.id().to_string(), second.id().to_string()],
            },
            focus: None,
        });
    }

    candidates
}

fn attack_candidates(
    state: &MatchState,
    unit: &UnitInstance,
    slot: &MoveSlot,
    from: Cell,
    base: TargetSelection,
    out: &mut Vec<Candidate>,
) {
    if !slot.is_damaging() {
        return;
    }
    let enemy = unit.side.opponent();

    match slot.data.targeting {
        Targeting::Single => {
            let range = slot.attack_range();
            for target in state.on_board(enemy) {
                if target.position.is_some_and(|cell| from.manhattan(cell) <= range) {
                    out.push(Candidate::card(unit.id, slot, base.at_unit(target.id), Some(target.id)));
                }
            }
            for block in state.blocks() {
                if from.manhattan(block.cell) <= range {
                    out.push(Candidate::card(unit.id, slot, base.at_block(block.id), None));
                }
            }
        }
        Targeting::Line { reach } => {
            for direction in Direction::ALL {
                if let Some(focus) = first_in_line(state, unit, from, direction, reach) {
                    out.push(Candidate::card(unit.id, slot, base.toward(direction), focus));
                }
            }
        }
        Targeting::Surrounding => {
            let adjacent_enemy = state
                .on_board(enemy)
                .find(|t| t.position.is_some_and(|cell| from.chebyshev(cell) == 1))
                .map(|t| t.id);
            let adjacent_block = state.blocks().any(|b| from.chebyshev(b.cell) == 1);
            if adjacent_enemy.is_some() || adjacent_block {
                out.push(Candidate::card(unit.id, slot, base, adjacent_enemy));
            }
        }
        Targeting::SelfOnly => {}
    }
}

/// What a beam from `from` would hit first.
///
/// `Some(Some(enemy))` for an enemy, `Some(None)` for a block, `None` for
/// nothing at all. Allies are passed through.
fn first_in_line(
    state: &MatchState,
    unit: &UnitInstance,
    from: Cell,
    direction: Direction,
    reach: u32,
) -> Option<Option<UnitId>> {
    for cell in from.ray(direction, reach) {
        if !state.territory().in_bounds(cell) {
            return None;
        }
        if state.block_at(cell).is_some() {
            return Some(None);
        }
        if let Some(other) = state.unit_at(cell) {
            if other.side != unit.side {
                return Some(Some(other.id));
            }
        }
    }
    None
}
