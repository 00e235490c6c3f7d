//! Test fixtures and helpers.
//!
//! Pre-built matches for consistent testing. Fixture builders panic on
//! invalid input; they are only meant for tests and benchmarks.

use skirmish_core::config::{MatchSetup, RulesConfig, SideSetup, UnitPlacement};
use skirmish_core::data::RosterData;
use skirmish_core::math::Cell;
use skirmish_core::rng::{seeded_rng, MatchRng};
use skirmish_core::side::Controller;
use skirmish_core::state::MatchState;

/// Standard AI-vs-AI match and its random stream.
///
/// # Panics
///
/// Panics if the standard setup is rejected.
#[must_use]
pub fn ai_match(seed: u64) -> (MatchState, MatchRng) {
    let setup = MatchSetup::standard(Controller::Ai, Controller::Ai);
    let state = MatchState::new(&setup, &RosterData::standard()).expect("standard setup is valid");
    (state, seeded_rng(seed))
}

/// Standard match with the given controllers.
///
/// # Panics
///
/// Panics if the standard setup is rejected.
#[must_use]
pub fn standard_match(blue: Controller, red: Controller) -> MatchState {
    MatchState::new(&MatchSetup::standard(blue, red), &RosterData::standard())
        .expect("standard setup is valid")
}

/// Builder for small matches with every unit already on the board.
#[derive(Debug, Clone)]
pub struct DuelBuilder {
    rules: RulesConfig,
    controllers: [Controller; 2],
    units: [Vec<UnitPlacement>; 2],
    roster: RosterData,
}

impl Default for DuelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DuelBuilder {
    /// Human-vs-human on an open 9×9 board with the standard roster.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: RulesConfig::open_board(9),
            controllers: [Controller::Human, Controller::Human],
            units: [Vec::new(), Vec::new()],
            roster: RosterData::standard(),
        }
    }

    /// Replace the rules.
    #[must_use]
    pub fn rules(mut self, rules: RulesConfig) -> Self {
        self.rules = rules;
        self
    }

    /// Replace the roster.
    #[must_use]
    pub fn roster(mut self, roster: RosterData) -> Self {
        self.roster = roster;
        self
    }

    /// Set both controllers.
    #[must_use]
    pub fn controllers(mut self, blue: Controller, red: Controller) -> Self {
        self.controllers = [blue, red];
        self
    }

    /// Place a Blue unit.
    #[must_use]
    pub fn blue(mut self, definition: &str, cell: Cell) -> Self {
        self.units[0].push(UnitPlacement::at(definition, cell));
        self
    }

    /// Place a Red unit.
    #[must_use]
    pub fn red(mut self, definition: &str, cell: Cell) -> Self {
        self.units[1].push(UnitPlacement::at(definition, cell));
        self
    }

    /// The setup this builder describes.
    #[must_use]
    pub fn setup(&self) -> MatchSetup {
        let [blue, red] = self.controllers;
        let [blue_units, red_units] = self.units.clone();
        MatchSetup {
            rules: self.rules.clone(),
            sides: [
                SideSetup {
                    controller: blue,
                    units: blue_units,
                },
                SideSetup {
                    controller: red,
                    units: red_units,
                },
            ],
        }
    }

    /// Create the match. Unit ids run Blue first, in placement order,
    /// starting at 1.
    ///
    /// # Panics
    ///
    /// Panics if the setup is rejected.
    #[must_use]
    pub fn build(&self) -> MatchState {
        MatchState::new(&self.setup(), &self.roster).expect("duel setup is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::side::Side;
    use skirmish_core::state::Phase;

    #[test]
    fn test_duel_builder_places_units() {
        let state = DuelBuilder::new()
            .blue("raichou", Cell::new(1, 1))
            .red("kidouba", Cell::new(7, 7))
            .build();
        assert_eq!(state.phase(), Phase::Planning);
        assert_eq!(state.unit(1).map(|u| u.side), Some(Side::Blue));
        assert_eq!(state.unit_at(Cell::new(7, 7)).map(|u| u.id), Some(2));
    }

    #[test]
    fn test_ai_match_is_past_deploy() {
        let (state, _) = ai_match(3);
        assert_ne!(state.phase(), Phase::Deploy);
    }
}
