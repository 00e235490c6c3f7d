//! Destructible obstacles.

use serde::{Deserialize, Serialize};

use crate::math::Cell;

/// Unique identifier for blocks.
pub type BlockId = u32;

/// Placement of a block in the rules configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPlacement {
    /// Cell the block occupies.
    pub cell: Cell,
    /// Starting integrity.
    pub integrity: u32,
}

/// A fixed-position destructible obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    /// Identifier.
    pub id: BlockId,
    /// Cell the block occupies.
    pub cell: Cell,
    /// Remaining integrity.
    pub integrity: u32,
    /// Starting integrity.
    pub max_integrity: u32,
}

impl Block {
    /// Create a block at full integrity.
    #[must_use]
    pub const fn new(id: BlockId, cell: Cell, integrity: u32) -> Self {
        Self {
            id,
            cell,
            integrity,
            max_integrity: integrity,
        }
    }

    /// Remove one point of integrity. Returns `true` if the block broke.
    pub fn chip(&mut self) -> bool {
        self.integrity = self.integrity.saturating_sub(1);
        self.integrity == 0
    }

    /// Whether the block has no integrity left.
    #[must_use]
    pub const fn is_broken(&self) -> bool {
        self.integrity == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chip_until_broken() {
        let mut block = Block::new(1, Cell::new(2, 2), 2);
        assert!(!block.chip());
        assert!(block.chip());
        assert!(block.is_broken());
        assert!(block.chip());
        assert_eq!(block.max_integrity, 2);
    }
}
