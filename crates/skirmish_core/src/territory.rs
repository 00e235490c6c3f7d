//! Territory ownership grid.
//!
//! An N×N grid of optional owners plus each side's registered home cells.
//! Home cells can never be painted by the opposing side and always anchor
//! their region during pruning.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::math::{bresenham_line, Cell};
use crate::side::Side;

/// Regions smaller than this are pruned unless anchored.
pub const MIN_COMPONENT_SIZE: usize = 4;

/// Per-cell ownership grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerritoryGrid {
    /// Board edge length in cells.
    size: i32,
    /// Owner per cell, stored in row-major order.
    cells: Vec<Option<Side>>,
    /// Registered home cells, indexed by [`Side::index`].
    homes: [Vec<Cell>; 2],
}

impl TerritoryGrid {
    /// Create an unowned `size`×`size` grid.
    ///
    /// # Panics
    ///
    /// Panics if `size` is not positive.
    #[must_use]
    pub fn new(size: i32) -> Self {
        assert!(size > 0, "TerritoryGrid size must be positive");
        Self {
            size,
            cells: vec![None; (size * size) as usize],
            homes: [Vec::new(), Vec::new()],
        }
    }

    /// Board edge length.
    #[must_use]
    pub const fn size(&self) -> i32 {
        self.size
    }

    /// Check if a cell is within grid bounds.
    #[must_use]
    pub const fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.size && cell.y < self.size
    }

    #[inline]
    fn index(&self, cell: Cell) -> usize {
        (cell.y * self.size + cell.x) as usize
    }

    /// Every cell of the board in scan order (`x` outer, `y` inner).
    pub fn all_cells(&self) -> impl Iterator<Item = Cell> {
        let size = self.size;
        (0..size).flat_map(move |x| (0..size).map(move |y| Cell::new(x, y)))
    }

    /// Owner of a cell. Returns `None` if unowned or out of bounds.
    #[must_use]
    pub fn owner(&self, cell: Cell) -> Option<Side> {
        if self.in_bounds(cell) {
            self.cells[self.index(cell)]
        } else {
            None
        }
    }

    /// Whether `side` owns the cell.
    #[must_use]
    pub fn is_owned_by(&self, cell: Cell, side: Side) -> bool {
        self.owner(cell) == Some(side)
    }

    /// The side whose home this cell is, if any.
    #[must_use]
    pub fn home_of(&self, cell: Cell) -> Option<Side> {
        Side::ALL
            .into_iter()
            .find(|side| self.homes[side.index()].contains(&cell))
    }

    /// Registered home cells of a side, in registration order.
    #[must_use]
    pub fn home_cells(&self, side: Side) -> &[Cell] {
        &self.homes[side.index()]
    }

    /// Register a home cell for `side` and paint it.
    ///
    /// Returns `false` if the cell is out of bounds or already a home cell.
    pub fn register_home(&mut self, cell: Cell, side: Side) -> bool {
        if !self.in_bounds(cell) || self.home_of(cell).is_some() {
            return false;
        }
        self.homes[side.index()].push(cell);
        let index = self.index(cell);
        self.cells[index] = Some(side);
        true
    }

    /// Paint a cell for `side`.
    ///
    /// Returns `false` without painting if the cell is out of bounds or is
    /// one of the opponent's home cells.
    pub fn paint(&mut self, cell: Cell, side: Side) -> bool {
        if !self.in_bounds(cell) || self.home_of(cell) == Some(side.opponent()) {
            return false;
        }
        let index = self.index(cell);
        self.cells[index] = Some(side);
        true
    }

    /// Paint every cell on the Bresenham line from `from` to `to`.
    ///
    /// Returns how many cells were painted.
    pub fn paint_line(&mut self, from: Cell, to: Cell, side: Side) -> usize {
        bresenham_line(from, to)
            .into_iter()
            .filter(|&cell| self.paint(cell, side))
            .count()
    }

    /// Clear ownership of a cell. Home cells are left alone.
    pub fn clear(&mut self, cell: Cell) -> bool {
        if !self.in_bounds(cell) || self.home_of(cell).is_some() {
            return false;
        }
        let index = self.index(cell);
        self.cells[index] = None;
        true
    }

    /// Number of cells owned by `side`.
    #[must_use]
    pub fn count(&self, side: Side) -> u32 {
        self.cells.iter().filter(|c| **c == Some(side)).count() as u32
    }

    /// The 4-connected region of `side`-owned cells containing `start`.
    fn component(&self, start: Cell, side: Side, seen: &mut [bool]) -> Vec<Cell> {
        let mut region = Vec::new();
        let mut frontier = VecDeque::from([start]);
        seen[self.index(start)] = true;

        while let Some(cell) = frontier.pop_front() {
            region.push(cell);
            for next in cell.neighbors() {
                if self.is_owned_by(next, side) && !seen[self.index(next)] {
                    seen[self.index(next)] = true;
                    frontier.push_back(next);
                }
            }
        }

        region
    }

    /// Revert small unanchored regions of `side` to unowned.
    ///
    /// A region survives if it has at least [`MIN_COMPONENT_SIZE`] cells,
    /// contains one of `side`'s home cells, or contains a cell in `anchors`
    /// (the cells occupied by `side`'s units). Returns the cleared cells in
    /// scan order.
    pub fn prune_disconnected(&mut self, side: Side, anchors: &BTreeSet<Cell>) -> Vec<Cell> {
        let mut seen = vec![false; self.cells.len()];
        let mut removed = Vec::new();

        for cell in self.all_cells().collect::<Vec<_>>() {
            if !self.is_owned_by(cell, side) || seen[self.index(cell)] {
                continue;
            }
            let region = self.component(cell, side, &mut seen);
            let anchored = region.iter().any(|c| {
                anchors.contains(c) || self.homes[side.index()].contains(c)
            });
            if region.len() < MIN_COMPONENT_SIZE && !anchored {
                removed.extend(region);
            }
        }

        for &cell in &removed {
            let index = self.index(cell);
            self.cells[index] = None;
        }
        removed.sort_unstable();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_and_owner() {
        let mut grid = TerritoryGrid::new(5);
        assert!(grid.paint(Cell::new(2, 3), Side::Blue));
        assert_eq!(grid.owner(Cell::new(2, 3)), Some(Side::Blue));
        assert!(grid.paint(Cell::new(2, 3), Side::Red));
        assert_eq!(grid.owner(Cell::new(2, 3)), Some(Side::Red));
        assert!(!grid.paint(Cell::new(5, 0), Side::Red));
        assert_eq!(grid.owner(Cell::new(-1, 0)), None);
    }

    #[test]
    fn test_home_cells_are_protected() {
        let mut grid = TerritoryGrid::new(5);
        assert!(grid.register_home(Cell::new(0, 0), Side::Blue));
        assert!(!grid.paint(Cell::new(0, 0), Side::Red));
        assert_eq!(grid.owner(Cell::new(0, 0)), Some(Side::Blue));
        assert!(grid.paint(Cell::new(0, 0), Side::Blue));
        assert!(!grid.clear(Cell::new(0, 0)));
        assert!(!grid.register_home(Cell::new(0, 0), Side::Red));
    }

    #[test]
    fn test_paint_line_leaves_trail() {
        let mut grid = TerritoryGrid::new(7);
        let painted = grid.paint_line(Cell::new(0, 0), Cell::new(4, 0), Side::Red);
        assert_eq!(painted, 5);
        assert_eq!(grid.count(Side::Red), 5);
    }

    #[test]
    fn test_paint_line_skips_enemy_home() {
        let mut grid = TerritoryGrid::new(7);
        grid.register_home(Cell::new(2, 0), Side::Blue);
        let painted = grid.paint_line(Cell::new(0, 0), Cell::new(4, 0), Side::Red);
        assert_eq!(painted, 4);
        assert_eq!(grid.owner(Cell::new(2, 0)), Some(Side::Blue));
    }

    #[test]
    fn test_prune_removes_isolated_small_region() {
        let mut grid = TerritoryGrid::new(7);
        grid.paint(Cell::new(3, 3), Side::Blue);
        grid.paint(Cell::new(3, 4), Side::Blue);
        let removed = grid.prune_disconnected(Side::Blue, &BTreeSet::new());
        assert_eq!(removed, vec![Cell::new(3, 3), Cell::new(3, 4)]);
        assert_eq!(grid.count(Side::Blue), 0);
    }

    #[test]
    fn test_prune_keeps_large_region() {
        let mut grid = TerritoryGrid::new(7);
        grid.paint_line(Cell::new(0, 2), Cell::new(3, 2), Side::Red);
        let removed = grid.prune_disconnected(Side::Red, &BTreeSet::new());
        assert!(removed.is_empty());
        assert_eq!(grid.count(Side::Red), 4);
    }

    #[test]
    fn test_prune_keeps_home_and_occupied_regions() {
        let mut grid = TerritoryGrid::new(7);
        grid.register_home(Cell::new(0, 0), Side::Blue);
        grid.paint(Cell::new(6, 6), Side::Blue);
        grid.paint(Cell::new(3, 3), Side::Blue);
        let anchors = BTreeSet::from([Cell::new(6, 6)]);

        let removed = grid.prune_disconnected(Side::Blue, &anchors);

        assert_eq!(removed, vec![Cell::new(3, 3)]);
        assert_eq!(grid.owner(Cell::new(0, 0)), Some(Side::Blue));
        assert_eq!(grid.owner(Cell::new(6, 6)), Some(Side::Blue));
    }

    #[test]
    fn test_prune_ignores_other_side() {
        let mut grid = TerritoryGrid::new(5);
        grid.paint(Cell::new(1, 1), Side::Red);
        let removed = grid.prune_disconnected(Side::Blue, &BTreeSet::new());
        assert!(removed.is_empty());
        assert_eq!(grid.owner(Cell::new(1, 1)), Some(Side::Red));
    }

    #[test]
    fn test_diagonal_cells_are_separate_regions() {
        let mut grid = TerritoryGrid::new(7);
        // Two L-shaped pairs touching only at a corner stay separate.
        grid.paint(Cell::new(1, 1), Side::Blue);
        grid.paint(Cell::new(1, 2), Side::Blue);
        grid.paint(Cell::new(2, 3), Side::Blue);
        grid.paint(Cell::new(3, 3), Side::Blue);
        let removed = grid.prune_disconnected(Side::Blue, &BTreeSet::new());
        assert_eq!(removed.len(), 4);
    }
}
