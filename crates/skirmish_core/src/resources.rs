//! Resource nodes and stockpiles.
//!
//! Each side holds a small stockpile of wood and stone. Nodes on the board
//! pay out when the end-of-cycle die roll matches their trigger number and
//! the owning side holds the node's cell.

use serde::{Deserialize, Serialize};

use crate::math::Cell;
use crate::rng::RandomSource;
use crate::side::Side;
use crate::territory::TerritoryGrid;

/// Faces on the production die.
pub const PRODUCTION_DIE_FACES: u32 = 6;

/// Kind of resource a node produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Wood.
    Wood,
    /// Stone.
    Stone,
}

/// Resource price of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ResourceCost {
    /// Wood required.
    #[serde(default)]
    pub wood: u32,
    /// Stone required.
    #[serde(default)]
    pub stone: u32,
}

impl ResourceCost {
    /// The free cost.
    pub const FREE: Self = Self { wood: 0, stone: 0 };

    /// Create a cost.
    #[must_use]
    pub const fn new(wood: u32, stone: u32) -> Self {
        Self { wood, stone }
    }

    /// Whether nothing has to be paid.
    #[must_use]
    pub const fn is_free(&self) -> bool {
        self.wood == 0 && self.stone == 0
    }

    /// Component-wise sum.
    #[must_use]
    pub const fn plus(self, other: Self) -> Self {
        Self {
            wood: self.wood + other.wood,
            stone: self.stone + other.stone,
        }
    }
}

/// A side's resource stockpile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Stockpile {
    /// Wood held.
    pub wood: u32,
    /// Stone held.
    pub stone: u32,
}

impl Stockpile {
    /// Whether the stockpile covers `cost`.
    #[must_use]
    pub const fn can_afford(&self, cost: ResourceCost) -> bool {
        self.wood >= cost.wood && self.stone >= cost.stone
    }

    /// Pay `cost`. Returns `false` and changes nothing when unaffordable.
    pub fn pay(&mut self, cost: ResourceCost) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.wood -= cost.wood;
        self.stone -= cost.stone;
        true
    }

    /// Add one unit of `kind`.
    pub fn add(&mut self, kind: ResourceKind, amount: u32) {
        match kind {
            ResourceKind::Wood => self.wood += amount,
            ResourceKind::Stone => self.stone += amount,
        }
    }
}

/// A producing node on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceNode {
    /// Cell the node sits on.
    pub cell: Cell,
    /// What it produces.
    pub kind: ResourceKind,
    /// Die face that triggers production.
    pub trigger: u32,
}

/// A single payout from [`produce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    /// Side that received the resource.
    pub side: Side,
    /// Node cell.
    pub cell: Cell,
    /// Resource produced.
    pub kind: ResourceKind,
}

/// Roll the production die and pay every matching owned node.
///
/// Returns the roll and the payouts in node order.
pub fn produce(
    nodes: &[ResourceNode],
    grid: &TerritoryGrid,
    stockpiles: &mut [Stockpile; 2],
    rng: &mut dyn RandomSource,
) -> (u32, Vec<Production>) {
    let roll = rng.roll_range(1, PRODUCTION_DIE_FACES);
    let mut payouts = Vec::new();

    for node in nodes.iter().filter(|n| n.trigger == roll) {
        if let Some(side) = grid.owner(node.cell) {
            stockpiles[side.index()].add(node.kind, 1);
            payouts.push(Production {
                side,
                cell: node.cell,
                kind: node.kind,
            });
        }
    }

    (roll, payouts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;

    #[test]
    fn test_pay_is_atomic() {
        let mut stock = Stockpile { wood: 1, stone: 0 };
        assert!(!stock.pay(ResourceCost::new(1, 1)));
        assert_eq!(stock, Stockpile { wood: 1, stone: 0 });
        assert!(stock.pay(ResourceCost::new(1, 0)));
        assert_eq!(stock.wood, 0);
    }

    #[test]
    fn test_produce_pays_owner_only() {
        let mut grid = TerritoryGrid::new(5);
        grid.paint(Cell::new(1, 1), Side::Red);
        let nodes = [
            ResourceNode {
                cell: Cell::new(1, 1),
                kind: ResourceKind::Stone,
                trigger: 1,
            },
            ResourceNode {
                cell: Cell::new(3, 3),
                kind: ResourceKind::Wood,
                trigger: 1,
            },
        ];
        let mut stock = [Stockpile::default(); 2];
        // roll_range(1, 6) with word 0 gives 1
        let mut rng = ScriptedRng::new(vec![0]);

        let (roll, payouts) = produce(&nodes, &grid, &mut stock, &mut rng);

        assert_eq!(roll, 1);
        assert_eq!(payouts.len(), 1);
        assert_eq!(stock[Side::Red.index()].stone, 1);
        assert_eq!(stock[Side::Blue.index()], Stockpile::default());
    }
}
