//! Engine benchmarks for skirmish_core.
//!
//! Run with: `cargo bench -p skirmish_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use std::collections::BTreeSet;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use skirmish_core::ai::choose_cycle_actions;
use skirmish_core::math::Cell;
use skirmish_core::pathfinding::reachable_set;
use skirmish_core::side::Side;
use skirmish_core::territory::TerritoryGrid;
use skirmish_test_utils::fixtures::ai_match;

pub fn pathfinding_benchmark(c: &mut Criterion) {
    let mut grid = TerritoryGrid::new(13);
    for x in 0..13 {
        grid.paint(Cell::new(x, 6), Side::Blue);
        grid.paint(Cell::new(6, x), Side::Red);
    }
    let occupied = BTreeSet::new();

    c.bench_function("reachable_set_13x13_allowance_5", |b| {
        b.iter(|| reachable_set(black_box(&grid), Cell::new(0, 0), 5, Side::Blue, &occupied));
    });
}

pub fn ai_benchmark(c: &mut Criterion) {
    let (state, _) = ai_match(9);

    c.bench_function("ai_choose_cycle_actions", |b| {
        b.iter(|| choose_cycle_actions(black_box(&state), Side::Blue));
    });
}

pub fn match_benchmark(c: &mut Criterion) {
    c.bench_function("full_ai_match", |b| {
        b.iter(|| {
            let (mut state, mut rng) = ai_match(black_box(31));
            while state.advance(&mut rng) {}
            state.state_hash()
        });
    });
}

criterion_group!(benches, pathfinding_benchmark, ai_benchmark, match_benchmark);
criterion_main!(benches);
