//! Fixed-point math and board geometry.
//!
//! Damage multipliers and AI scores use fixed-point arithmetic so every
//! platform produces bit-identical results. Board positions are plain
//! integer cells.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all fractional engine math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Build a fixed-point ratio `numerator / denominator`.
///
/// Returns zero when `denominator` is zero.
#[must_use]
pub fn ratio(numerator: u32, denominator: u32) -> Fixed {
    if denominator == 0 {
        return Fixed::ZERO;
    }
    Fixed::from_num(numerator) / Fixed::from_num(denominator)
}

/// A board cell. `x` grows to the right, `y` grows downward.
///
/// Cells order by `x` first, then `y`, which is the scan order used
/// everywhere the engine needs a deterministic tie-break.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Cell {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Cell {
    /// Create a new cell.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance between two cells.
    #[must_use]
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Chebyshev (king-move) distance between two cells.
    #[must_use]
    pub fn chebyshev(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// The cell shifted by a delta.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The cell `steps` cells away in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction, steps: i32) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx * steps, dy * steps)
    }

    /// Cells a beam passes through, nearest first, not including this cell.
    pub fn ray(self, direction: Direction, reach: u32) -> impl Iterator<Item = Self> {
        (1..=reach as i32).map(move |steps| self.step(direction, steps))
    }

    /// Whether `other` lies on the same row or column.
    #[must_use]
    pub const fn is_aligned(self, other: Self) -> bool {
        self.x == other.x || self.y == other.y
    }

    /// The four orthogonal neighbours, in [`Direction::ALL`] order.
    #[must_use]
    pub const fn neighbors(self) -> [Self; 4] {
        [
            self.step(Direction::North, 1),
            self.step(Direction::East, 1),
            self.step(Direction::South, 1),
            self.step(Direction::West, 1),
        ]
    }
}

/// Orthogonal direction used by line attacks and alternate moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards `y = 0`.
    North,
    /// Towards larger `x`.
    East,
    /// Towards larger `y`.
    South,
    /// Towards `x = 0`.
    West,
}

impl Direction {
    /// All directions in a fixed order.
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Unit step for this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// An inclusive rectangle of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Zone {
    /// Top-left corner (inclusive).
    pub min: Cell,
    /// Bottom-right corner (inclusive).
    pub max: Cell,
}

impl Zone {
    /// Create a zone from two inclusive corners.
    #[must_use]
    pub const fn new(min: Cell, max: Cell) -> Self {
        Self { min, max }
    }

    /// The centered `span`×`span` zone of a `board_size` board.
    #[must_use]
    pub const fn centered(board_size: i32, span: i32) -> Self {
        let start = (board_size - span) / 2;
        Self {
            min: Cell::new(start, start),
            max: Cell::new(start + span - 1, start + span - 1),
        }
    }

    /// Whether the cell lies inside the zone.
    #[must_use]
    pub const fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.min.x && cell.x <= self.max.x && cell.y >= self.min.y && cell.y <= self.max.y
    }

    /// Every cell of the zone in scan order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (self.min.x..=self.max.x).flat_map(move |x| (self.min.y..=self.max.y).map(move |y| Cell::new(x, y)))
    }
}

/// Cells on the integer line from `from` to `to`, both ends included.
///
/// Bresenham's algorithm; consecutive cells are 8-connected.
#[must_use]
pub fn bresenham_line(from: Cell, to: Cell) -> Vec<Cell> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let mut current = from;
    let mut cells = Vec::with_capacity((dx - dy) as usize + 1);

    loop {
        cells.push(current);
        if current == to {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            current.x += sx;
        }
        if e2 <= dx {
            err += dx;
            current.y += sy;
        }
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_and_chebyshev() {
        let a = Cell::new(1, 2);
        let b = Cell::new(4, 0);
        assert_eq!(a.manhattan(b), 5);
        assert_eq!(a.chebyshev(b), 3);
        assert_eq!(a.manhattan(a), 0);
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio(1, 2), Fixed::from_num(0.5));
        assert_eq!(ratio(3, 0), Fixed::ZERO);
    }

    #[test]
    fn test_centered_zone() {
        let zone = Zone::centered(13, 3);
        assert_eq!(zone.min, Cell::new(5, 5));
        assert_eq!(zone.max, Cell::new(7, 7));
        assert!(zone.contains(Cell::new(6, 6)));
        assert!(!zone.contains(Cell::new(4, 6)));
        assert_eq!(zone.cells().count(), 9);
    }

    #[test]
    fn test_bresenham_endpoints() {
        let line = bresenham_line(Cell::new(0, 0), Cell::new(4, 2));
        assert_eq!(line.first(), Some(&Cell::new(0, 0)));
        assert_eq!(line.last(), Some(&Cell::new(4, 2)));
        for pair in line.windows(2) {
            assert_eq!(pair[0].chebyshev(pair[1]), 1);
        }
    }

    #[test]
    fn test_bresenham_single_cell() {
        assert_eq!(bresenham_line(Cell::new(3, 3), Cell::new(3, 3)), vec![Cell::new(3, 3)]);
    }

    #[test]
    fn test_bresenham_straight_line() {
        let line = bresenham_line(Cell::new(2, 5), Cell::new(2, 1));
        assert_eq!(line.len(), 5);
        assert!(line.iter().all(|c| c.x == 2));
    }
}
