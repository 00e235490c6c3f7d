//! Deploy phase rules driven through the public entry points.

use skirmish_core::error::{GameError, IllegalAction};
use skirmish_core::math::Cell;
use skirmish_core::side::{Controller, Side};
use skirmish_core::state::Phase;
use skirmish_test_utils::fixtures::standard_match;

fn invalid_cell_reason(err: GameError) -> &'static str {
    match err {
        GameError::IllegalAction(IllegalAction::InvalidDeployCell { reason, .. }) => reason,
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_deploy_turns_alternate() {
    let mut state = standard_match(Controller::Human, Controller::Human);
    assert_eq!(state.phase(), Phase::Deploy);
    assert_eq!(state.deploy_turn(), Some(Side::Blue));

    state.deploy_unit(Side::Blue, 1, Cell::new(0, 0)).unwrap();
    assert_eq!(state.deploy_turn(), Some(Side::Red));
    assert_eq!(state.territory().home_of(Cell::new(0, 0)), Some(Side::Blue));

    assert_eq!(
        state.deploy_unit(Side::Blue, 2, Cell::new(0, 12)),
        Err(GameError::IllegalAction(IllegalAction::NotYourDeployTurn(Side::Blue)))
    );
}

#[test]
fn test_deploy_cell_rejections() {
    let mut state = standard_match(Controller::Human, Controller::Human);

    let center = state.deploy_unit(Side::Blue, 1, Cell::new(6, 6)).unwrap_err();
    assert_eq!(invalid_cell_reason(center), "inside the center zone");

    let block = state.deploy_unit(Side::Blue, 1, Cell::new(6, 2)).unwrap_err();
    assert_eq!(invalid_cell_reason(block), "a block stands there");

    let off_board = state.deploy_unit(Side::Blue, 1, Cell::new(13, 0)).unwrap_err();
    assert_eq!(invalid_cell_reason(off_board), "out of bounds");

    state.deploy_unit(Side::Blue, 1, Cell::new(0, 0)).unwrap();
    let crowded = state.deploy_unit(Side::Red, 5, Cell::new(1, 1)).unwrap_err();
    assert_eq!(invalid_cell_reason(crowded), "too close to another unit");

    state.deploy_unit(Side::Red, 5, Cell::new(12, 12)).unwrap();
    assert_eq!(state.deploy_turn(), Some(Side::Blue));
}

#[test]
fn test_deploy_completes_into_planning() {
    let mut state = standard_match(Controller::Human, Controller::Human);
    let field = state.rules().units_on_field;
    let blue_cells = [Cell::new(0, 0), Cell::new(0, 4), Cell::new(0, 8)];
    let red_cells = [Cell::new(12, 12), Cell::new(12, 8), Cell::new(12, 4)];

    for index in 0..field {
        state
            .deploy_unit(Side::Blue, index as u32 + 1, blue_cells[index])
            .unwrap();
        state
            .deploy_unit(Side::Red, index as u32 + 5, red_cells[index])
            .unwrap();
    }

    assert_eq!(state.phase(), Phase::Planning);
    assert_eq!(state.on_board(Side::Blue).count(), field);
    assert_eq!(state.territory().home_cells(Side::Red).len(), 3);
}

#[test]
fn test_ai_deploys_after_human() {
    let mut state = standard_match(Controller::Human, Controller::Ai);
    state.deploy_unit(Side::Blue, 1, Cell::new(0, 0)).unwrap();
    assert_eq!(state.deploy_turn(), Some(Side::Blue));
    assert_eq!(state.on_board(Side::Red).count(), 1);
}
