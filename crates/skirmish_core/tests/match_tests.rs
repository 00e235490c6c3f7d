//! Whole-match tests: AI play, upgrades and verified replays.

use skirmish_core::actions::{PlanChoice, UpgradeKind};
use skirmish_core::config::RulesConfig;
use skirmish_core::error::{GameError, IllegalAction};
use skirmish_core::math::Cell;
use skirmish_core::replay::{Replay, ReplayInput, ReplayPlayer};
use skirmish_core::rng::seeded_rng;
use skirmish_core::side::{Controller, Side};
use skirmish_core::state::Phase;
use skirmish_test_utils::fixtures::{ai_match, DuelBuilder};

#[test]
fn test_ai_match_runs_to_completion() {
    let (mut state, mut rng) = ai_match(2024);
    let mut steps = 0;
    while state.advance(&mut rng) {
        steps += 1;
        assert!(steps < 100_000, "match did not finish");
    }
    assert!(state.is_over());
    assert!(state.outcome().is_some());
    assert!(state.scheduler_status().awaiting().is_none());
    assert!(state.cycle() <= state.rules().max_cycles);
}

#[test]
fn test_full_match_replay_verifies_from_disk() {
    let seed = 77;
    let (mut state, mut rng) = ai_match(seed);
    let mut replay = Replay::new("standard", seed, &state).unwrap();
    while !state.is_over() {
        replay.play(&mut state, &mut rng, ReplayInput::Advance).unwrap();
    }
    replay.finalize(&state);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("match.replay");
    replay.save(&path).unwrap();

    let mut player = ReplayPlayer::new(Replay::load(&path).unwrap()).unwrap();
    assert!(player.verify().unwrap());
    assert!(player.state().is_over());
    assert_eq!(player.state().outcome(), state.outcome());
}

#[test]
fn test_human_inputs_replay() {
    let rules = RulesConfig {
        upgrades_enabled: true,
        cycles_per_phase: 1,
        ..RulesConfig::open_board(9)
    };
    let mut state = DuelBuilder::new()
        .rules(rules)
        .controllers(Controller::Human, Controller::Ai)
        .blue("raichou", Cell::new(0, 0))
        .red("kidouba", Cell::new(8, 8))
        .build();
    let mut rng = seeded_rng(5);
    let mut replay = Replay::new("upgrade", 5, &state).unwrap();

    replay
        .play(
            &mut state,
            &mut rng,
            ReplayInput::SubmitPlan {
                side: Side::Blue,
                unit: 1,
                choice: PlanChoice::alternate("quick-attack"),
            },
        )
        .unwrap();
    replay
        .play(&mut state, &mut rng, ReplayInput::ConfirmPlan { side: Side::Blue })
        .unwrap();
    assert_eq!(state.phase(), Phase::Resolution);

    replay
        .play(
            &mut state,
            &mut rng,
            ReplayInput::SupplyTarget {
                selection: skirmish_core::actions::TargetSelection::none().to_cell(Cell::new(2, 0)),
            },
        )
        .unwrap();
    assert_eq!(state.unit(1).unwrap().position, Some(Cell::new(2, 0)));
    assert_eq!(state.phase(), Phase::Upgrade);
    assert!(state.upgrade_status(Side::Red).confirmed);

    let not_applicable = state.apply_upgrade(Side::Blue, 1, "swap", UpgradeKind::Power);
    assert_eq!(
        not_applicable,
        Err(GameError::IllegalAction(IllegalAction::UpgradeNotApplicable("swap".into())))
    );

    let upgrade = ReplayInput::ApplyUpgrade {
        side: Side::Blue,
        unit: 1,
        move_id: "thunderbolt".into(),
        kind: UpgradeKind::Power,
    };
    replay.play(&mut state, &mut rng, upgrade.clone()).unwrap();
    assert_eq!(
        state.unit(1).unwrap().move_slot("thunderbolt").unwrap().bonus_power,
        state.rules().upgrade_power_bonus
    );
    assert_eq!(
        replay.play(&mut state, &mut rng, upgrade),
        Err(GameError::IllegalAction(IllegalAction::AlreadyUpgraded(Side::Blue)))
    );

    replay
        .play(&mut state, &mut rng, ReplayInput::ConfirmUpgrade { side: Side::Blue })
        .unwrap();
    assert_eq!(state.phase(), Phase::Planning);
    replay.finalize(&state);

    assert_eq!(replay.input_count(), 5);
    let mut player = ReplayPlayer::new(replay).unwrap();
    assert!(player.verify().unwrap());
}
