//! Small match builders shared by unit tests.

use crate::config::{MatchSetup, RulesConfig, SideSetup, UnitPlacement};
use crate::data::RosterData;
use crate::math::Cell;
use crate::side::Controller;
use crate::state::MatchState;

/// Human-vs-human match on an open 9×9 board with every unit placed.
///
/// Ids are assigned Blue first, in list order, starting at 1.
pub(crate) fn duel(blue: &[(&str, Cell)], red: &[(&str, Cell)]) -> MatchState {
    let placements = |units: &[(&str, Cell)]| {
        units
            .iter()
            .map(|(definition, cell)| UnitPlacement::at(*definition, *cell))
            .collect::<Vec<_>>()
    };
    let setup = MatchSetup {
        rules: RulesConfig::open_board(9),
        sides: [
            SideSetup {
                controller: Controller::Human,
                units: placements(blue),
            },
            SideSetup {
                controller: Controller::Human,
                units: placements(red),
            },
        ],
    };
    MatchState::new(&setup, &RosterData::standard()).expect("fixture setup is valid")
}
