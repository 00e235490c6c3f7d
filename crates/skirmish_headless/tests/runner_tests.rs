//! Runner behavior checked against direct engine play.

use skirmish_core::replay::{Replay, ReplayPlayer};
use skirmish_headless::{run_batch, BatchConfig, MatchConfig, MatchRunner};
use skirmish_test_utils::fixtures::ai_match;

#[test]
fn test_runner_matches_direct_engine_play() {
    let seed = 55;
    let (mut state, mut rng) = ai_match(seed);
    while state.advance(&mut rng) {}

    let (summary, _) = MatchRunner::new(MatchConfig::default(), seed).run().unwrap();
    assert_eq!(summary.final_hash, state.state_hash());
    assert_eq!(summary.outcome, state.outcome().unwrap());
    assert_eq!(summary.cycles, state.cycle());
}

#[test]
fn test_recorded_replay_survives_disk() {
    let (_, replay) = MatchRunner::new(MatchConfig::default(), 3)
        .recording(true)
        .run()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seed-3.replay");
    replay.unwrap().save(&path).unwrap();

    let mut player = ReplayPlayer::new(Replay::load(&path).unwrap()).unwrap();
    assert!(player.verify().unwrap());
}

#[test]
fn test_batch_is_seed_ordered_and_reproducible() {
    let config = BatchConfig::new(4).with_seed(100);
    let first = run_batch(config.clone(), &MatchConfig::default());
    let second = run_batch(config, &MatchConfig::default());

    let seeds: Vec<u64> = first.matches.iter().map(|m| m.seed).collect();
    assert_eq!(seeds, vec![100, 101, 102, 103]);
    assert_eq!(first.matches, second.matches);
}
