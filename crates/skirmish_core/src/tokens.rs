//! Point tokens: scheduled scoring pickups.
//!
//! Tokens are announced one cycle ahead as pending tokens, materialize at
//! the next cycle boundary, and are banked by whichever side owns the cell
//! they rest on. Uncollected tokens expire.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::math::{Cell, Zone};
use crate::rng::RandomSource;
use crate::side::Side;
use crate::territory::TerritoryGrid;

/// Value of a common token.
pub const LOW_TOKEN_VALUE: u32 = 1;
/// Value of a rare token.
pub const HIGH_TOKEN_VALUE: u32 = 5;
/// Percent chance that a new token is high value.
pub const HIGH_VALUE_PERCENT: u32 = 20;
/// Percent chance that a new token is placed in the central zone.
pub const CENTER_BIAS_PERCENT: u32 = 50;
/// Fewest tokens announced per cycle.
pub const MIN_TOKENS_PER_CYCLE: u32 = 2;
/// Most tokens announced per cycle.
pub const MAX_TOKENS_PER_CYCLE: u32 = 4;
/// Cycle boundaries an active token survives uncollected.
pub const TOKEN_LIFETIME: u32 = 3;
/// Placement attempts per token before giving up.
const PLACEMENT_ATTEMPTS: u32 = 8;

/// An active token on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointToken {
    /// Cell the token rests on.
    pub cell: Cell,
    /// Points awarded on collection.
    pub value: u32,
    /// Cycle boundaries left before expiry.
    pub cycles_left: u32,
}

/// A token announced for the next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingToken {
    /// Cell the token will appear on.
    pub cell: Cell,
    /// Points it will award.
    pub value: u32,
}

/// A banked token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collected {
    /// Side that banked it.
    pub side: Side,
    /// Where it was.
    pub cell: Cell,
    /// Points banked.
    pub value: u32,
}

/// Active and pending tokens of a match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenField {
    /// Tokens on the board.
    pub active: Vec<PointToken>,
    /// Tokens announced for the next cycle.
    pub pending: Vec<PendingToken>,
}

impl TokenField {
    /// Whether any active or pending token occupies the cell.
    #[must_use]
    pub fn is_marked(&self, cell: Cell) -> bool {
        self.active.iter().any(|t| t.cell == cell) || self.pending.iter().any(|t| t.cell == cell)
    }

    /// Every active and pending token cell.
    pub fn all_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.active
            .iter()
            .map(|t| t.cell)
            .chain(self.pending.iter().map(|t| t.cell))
    }

    /// Remove every active token resting on an owned cell.
    ///
    /// Returns what was banked, in token order.
    pub fn collect(&mut self, grid: &TerritoryGrid) -> Vec<Collected> {
        let mut banked = Vec::new();
        self.active.retain(|token| match grid.owner(token.cell) {
            Some(side) => {
                banked.push(Collected {
                    side,
                    cell: token.cell,
                    value: token.value,
                });
                false
            }
            None => true,
        });
        banked
    }

    /// Advance the token schedule by one cycle boundary.
    ///
    /// Ages and expires active tokens, materializes pending ones, then
    /// announces a fresh batch. `blocked` cells (blocks) never receive a
    /// token. Returns the number of tokens announced.
    pub fn spawn(
        &mut self,
        grid: &TerritoryGrid,
        zone: Zone,
        blocked: &BTreeSet<Cell>,
        rng: &mut dyn RandomSource,
    ) -> usize {
        for token in &mut self.active {
            token.cycles_left = token.cycles_left.saturating_sub(1);
        }
        self.active.retain(|t| t.cycles_left > 0);

        for pending in std::mem::take(&mut self.pending) {
            if !self.active.iter().any(|t| t.cell == pending.cell) {
                self.active.push(PointToken {
                    cell: pending.cell,
                    value: pending.value,
                    cycles_left: TOKEN_LIFETIME,
                });
            }
        }

        let count = rng.roll_range(MIN_TOKENS_PER_CYCLE, MAX_TOKENS_PER_CYCLE);
        for _ in 0..count {
            let in_zone = rng.roll_percent(CENTER_BIAS_PERCENT);
            let Some(cell) = self.pick_cell(grid, zone, in_zone, blocked, rng) else {
                continue;
            };
            let value = if rng.roll_percent(HIGH_VALUE_PERCENT) {
                HIGH_TOKEN_VALUE
            } else {
                LOW_TOKEN_VALUE
            };
            self.pending.push(PendingToken { cell, value });
        }

        self.pending.len()
    }

    fn pick_cell(
        &self,
        grid: &TerritoryGrid,
        zone: Zone,
        in_zone: bool,
        blocked: &BTreeSet<Cell>,
        rng: &mut dyn RandomSource,
    ) -> Option<Cell> {
        let (min, max) = if in_zone {
            (zone.min, zone.max)
        } else {
            let last = grid.size() - 1;
            (Cell::new(0, 0), Cell::new(last, last))
        };

        for _ in 0..PLACEMENT_ATTEMPTS {
            let x = rng.roll_range(min.x as u32, max.x as u32) as i32;
            let y = rng.roll_range(min.y as u32, max.y as u32) as i32;
            let cell = Cell::new(x, y);
            if grid.in_bounds(cell) && !blocked.contains(&cell) && !self.is_marked(cell) {
                return Some(cell);
            }
        }
        None
    }
}
