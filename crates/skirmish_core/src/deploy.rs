//! Deploy rules and phase entry.
//!
//! Sides take turns placing one benched unit each until neither side needs
//! or is able to place another. The side with fewer units on the board
//! deploys first; Blue breaks ties.

use crate::ai;
use crate::events::MatchEvent;
use crate::math::Cell;
use crate::side::Side;
use crate::state::{MatchState, Phase};
use crate::units::UnitId;

impl MatchState {
    /// Why `cell` cannot receive a deployed unit, or `None` if it can.
    #[must_use]
    pub fn deploy_cell_error(&self, cell: Cell) -> Option<&'static str> {
        if !self.territory.in_bounds(cell) {
            return Some("out of bounds");
        }
        if self.rules.center_zone().contains(cell) {
            return Some("inside the center zone");
        }
        if self.block_at(cell).is_some() {
            return Some("a block stands there");
        }
        if self.unit_at(cell).is_some() {
            return Some("occupied");
        }
        let crowded = self
            .units
            .values()
            .filter_map(|u| u.position)
            .any(|other| cell.manhattan(other) < self.rules.deploy_min_distance);
        if crowded {
            return Some("too close to another unit");
        }
        None
    }

    /// Every cell a unit could be deployed on right now, in scan order.
    #[must_use]
    pub fn legal_deploy_cells(&self) -> Vec<Cell> {
        self.territory
            .all_cells()
            .filter(|cell| self.deploy_cell_error(*cell).is_none())
            .collect()
    }

    /// Whether `side` still has a unit to place and somewhere to place it.
    #[must_use]
    pub fn needs_deploy(&self, side: Side) -> bool {
        self.on_board(side).count() < self.rules.units_on_field
            && self.units_of(side).any(|u| u.is_benched())
            && !self.legal_deploy_cells().is_empty()
    }

    fn first_deployer(&self) -> Option<Side> {
        Side::ALL
            .into_iter()
            .filter(|side| self.needs_deploy(*side))
            .min_by_key(|side| self.on_board(*side).count())
    }

    /// Open a deploy round if anyone needs one, otherwise start planning.
    pub(crate) fn enter_deploy_or_planning(&mut self) {
        if self.is_over() {
            return;
        }
        match self.first_deployer() {
            Some(side) => {
                self.phase = Phase::Deploy;
                self.deploy_turn = Some(side);
                self.push_event(MatchEvent::PhaseStarted {
                    phase: Phase::Deploy,
                    phase_number: self.phase_number,
                });
                tracing::debug!(side = ?side, "Deploy round opened");
            }
            None => self.enter_planning(),
        }
    }

    pub(crate) fn enter_planning(&mut self) {
        self.phase = Phase::Planning;
        self.deploy_turn = None;
        self.plans = Default::default();
        self.push_event(MatchEvent::PhaseStarted {
            phase: Phase::Planning,
            phase_number: self.phase_number,
        });
    }

    pub(crate) fn enter_upgrade(&mut self) {
        self.phase = Phase::Upgrade;
        self.upgrades = Default::default();
        self.push_event(MatchEvent::PhaseStarted {
            phase: Phase::Upgrade,
            phase_number: self.phase_number,
        });
    }

    /// Put a benched unit on `cell` and pass the deploy turn.
    ///
    /// The caller has already checked the cell.
    pub(crate) fn place_unit(&mut self, id: UnitId, cell: Cell) {
        let Some(side) = self.unit(id).map(|u| u.side) else {
            return;
        };

        let home = self.territory.home_cells(side).len() < self.rules.home_cells_per_side
            && self.territory.register_home(cell, side);
        if !home {
            self.territory.paint(cell, side);
        }

        let Some(unit) = self.unit_mut(id) else {
            return;
        };
        unit.position = Some(cell);
        let label = unit.label();
        self.push_event(MatchEvent::Deployed {
            unit: label,
            cell,
            home,
        });

        let opponent = side.opponent();
        if self.needs_deploy(opponent) {
            self.deploy_turn = Some(opponent);
        } else if self.needs_deploy(side) {
            self.deploy_turn = Some(side);
        } else {
            self.enter_planning();
        }
    }

    /// Deploy one unit for the AI side whose turn it is.
    ///
    /// Returns `false` if it is not an AI deploy turn or nothing could be
    /// placed.
    pub(crate) fn ai_deploy_step(&mut self) -> bool {
        if self.phase != Phase::Deploy {
            return false;
        }
        let Some(side) = self.deploy_turn else {
            return false;
        };
        if self.controller(side).is_human() {
            return false;
        }

        let placement = self
            .units_of(side)
            .filter(|u| u.is_benched())
            .find_map(|u| ai::choose_deploy_cell(self, u.id, side).map(|cell| (u.id, cell)));
        match placement {
            Some((id, cell)) => {
                self.place_unit(id, cell);
                true
            }
            None => false,
        }
    }

    /// Take AI deploy turns until a human must act or deploying ends.
    pub(crate) fn run_ai_deploys(&mut self) {
        while self.ai_deploy_step() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MatchSetup, RulesConfig};
    use crate::data::RosterData;
    use crate::side::Controller;
    use crate::test_fixtures::duel;

    fn fresh(blue: Controller, red: Controller) -> MatchState {
        let mut setup = MatchSetup::standard(blue, red);
        setup.rules = RulesConfig::open_board(9);
        MatchState::new(&setup, &RosterData::standard()).unwrap()
    }

    #[test]
    fn test_deploy_cell_rules() {
        let state = duel(&[("raichou", Cell::new(1, 1))], &[("kidouba", Cell::new(7, 7))]);
        assert_eq!(state.deploy_cell_error(Cell::new(-1, 0)), Some("out of bounds"));
        assert_eq!(state.deploy_cell_error(Cell::new(4, 4)), Some("inside the center zone"));
        assert_eq!(state.deploy_cell_error(Cell::new(1, 1)), Some("occupied"));
        assert_eq!(state.deploy_cell_error(Cell::new(2, 2)), Some("too close to another unit"));
        assert_eq!(state.deploy_cell_error(Cell::new(1, 4)), None);
    }

    #[test]
    fn test_human_match_opens_in_deploy_with_blue() {
        let state = fresh(Controller::Human, Controller::Human);
        assert_eq!(state.phase(), Phase::Deploy);
        assert_eq!(state.deploy_turn(), Some(Side::Blue));
    }

    #[test]
    fn test_ai_match_deploys_to_planning() {
        let state = fresh(Controller::Ai, Controller::Ai);
        assert_eq!(state.phase(), Phase::Planning);
        assert_eq!(state.on_board(Side::Blue).count(), 3);
        assert_eq!(state.on_board(Side::Red).count(), 3);
        assert_eq!(state.territory().home_cells(Side::Blue).len(), 3);
    }

    #[test]
    fn test_ai_answers_human_deploy() {
        let mut state = fresh(Controller::Human, Controller::Ai);
        state.deploy_unit(Side::Blue, 1, Cell::new(0, 0)).unwrap();
        assert_eq!(state.on_board(Side::Red).count(), 1);
        assert_eq!(state.deploy_turn(), Some(Side::Blue));
    }

    #[test]
    fn test_deployed_cells_respect_spacing() {
        let state = fresh(Controller::Ai, Controller::Ai);
        let cells: Vec<Cell> = state.units().filter_map(|u| u.position).collect();
        for (i, a) in cells.iter().enumerate() {
            for b in &cells[i + 1..] {
                assert!(a.manhattan(*b) >= 3);
            }
            assert!(!state.rules().center_zone().contains(*a));
        }
    }
}
