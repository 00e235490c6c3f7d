//! Tile-cost search over the territory grid.
//!
//! Entering a cell owned by the moving side costs 0; entering any other
//! cell costs 1. Movement is 4-directional. Costs only ever take the
//! values 0 and 1, so a double-ended breadth-first search (0-1 BFS) gives
//! exact minimum costs without a priority queue.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::math::Cell;
use crate::side::Side;
use crate::territory::TerritoryGrid;

/// A cell reachable within an allowance, with one cheapest route to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachableCell {
    /// Destination.
    pub cell: Cell,
    /// Minimum cost to enter it.
    pub cost: u32,
    /// Route from the start cell to `cell`, both included.
    pub path: Vec<Cell>,
}

/// Minimum costs and predecessors from one start cell.
struct CostField {
    size: i32,
    dist: Vec<Option<u32>>,
    parent: Vec<Option<Cell>>,
}

impl CostField {
    #[inline]
    fn index(&self, cell: Cell) -> usize {
        (cell.y * self.size + cell.x) as usize
    }

    fn cost(&self, cell: Cell) -> Option<u32> {
        self.dist[self.index(cell)]
    }

    fn path_to(&self, cell: Cell) -> Vec<Cell> {
        let mut path = vec![cell];
        let mut current = cell;
        while let Some(previous) = self.parent[self.index(current)] {
            path.push(previous);
            current = previous;
        }
        path.reverse();
        path
    }
}

/// Explore every cell whose cost from `start` does not exceed `limit`.
fn explore(grid: &TerritoryGrid, start: Cell, side: Side, limit: u32) -> CostField {
    let size = grid.size();
    let cell_count = (size * size) as usize;
    let mut field = CostField {
        size,
        dist: vec![None; cell_count],
        parent: vec![None; cell_count],
    };
    if !grid.in_bounds(start) {
        return field;
    }

    let start_index = field.index(start);
    field.dist[start_index] = Some(0);
    let mut frontier = VecDeque::from([(start, 0u32)]);

    while let Some((cell, cost)) = frontier.pop_front() {
        // Skip entries superseded by a cheaper route.
        if field.cost(cell) != Some(cost) {
            continue;
        }
        for next in cell.neighbors() {
            if !grid.in_bounds(next) {
                continue;
            }
            let step = u32::from(!grid.is_owned_by(next, side));
            let next_cost = cost + step;
            if next_cost > limit {
                continue;
            }
            let next_index = field.index(next);
            if field.dist[next_index].map_or(true, |known| next_cost < known) {
                field.dist[next_index] = Some(next_cost);
                field.parent[next_index] = Some(cell);
                if step == 0 {
                    frontier.push_front((next, next_cost));
                } else {
                    frontier.push_back((next, next_cost));
                }
            }
        }
    }

    field
}

/// Minimum cost for `side` to travel from `start` to `end`.
///
/// Returns `None` if either cell is out of bounds.
#[must_use]
pub fn move_cost(grid: &TerritoryGrid, start: Cell, end: Cell, side: Side) -> Option<u32> {
    if !grid.in_bounds(start) || !grid.in_bounds(end) {
        return None;
    }
    explore(grid, start, side, u32::MAX).cost(end)
}

/// Every cell `side` can reach from `start` within `allowance`.
///
/// Cells in `occupied` (other units and blocks) can be crossed but are not
/// valid destinations. The start cell is always included at cost 0.
/// Results are ordered by cost, then by cell.
#[must_use]
pub fn reachable_set(
    grid: &TerritoryGrid,
    start: Cell,
    allowance: u32,
    side: Side,
    occupied: &BTreeSet<Cell>,
) -> Vec<ReachableCell> {
    if !grid.in_bounds(start) {
        return Vec::new();
    }
    let field = explore(grid, start, side, allowance);

    let mut reachable: Vec<ReachableCell> = grid
        .all_cells()
        .filter(|cell| *cell == start || !occupied.contains(cell))
        .filter_map(|cell| {
            field.cost(cell).map(|cost| ReachableCell {
                cell,
                cost,
                path: field.path_to(cell),
            })
        })
        .collect();

    reachable.sort_by_key(|r| (r.cost, r.cell));
    reachable
}

/// Whether `side` may move from `start` to `end` with `allowance`.
///
/// The destination must be in bounds, unoccupied and within the allowance.
#[must_use]
pub fn can_move(
    grid: &TerritoryGrid,
    start: Cell,
    end: Cell,
    allowance: u32,
    side: Side,
    occupied: &BTreeSet<Cell>,
) -> bool {
    if occupied.contains(&end) {
        return false;
    }
    move_cost(grid, start, end, side).is_some_and(|cost| cost <= allowance)
}
