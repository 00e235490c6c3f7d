//! Match rules and setup.
//!
//! Everything a match needs besides the roster: board geometry, scoring
//! thresholds, obstacle and resource layouts, AI weights, and which side
//! fields which units under which controller. All structs deserialize from
//! RON with defaults for omitted fields.

use serde::{Deserialize, Serialize};

use crate::ai::AiWeights;
use crate::blocks::BlockPlacement;
use crate::error::{GameError, Result};
use crate::math::{Cell, Zone};
use crate::resources::{ResourceKind, ResourceNode, PRODUCTION_DIE_FACES};
use crate::side::{Controller, Side};

/// Default board edge length.
pub const DEFAULT_BOARD_SIZE: i32 = 13;
/// Edge length of the default central zone.
pub const CENTER_ZONE_SPAN: i32 = 3;
/// Points credited for a knockout.
pub const DEFAULT_KILL_BONUS: u32 = 5;

/// Tunable rules of a match.
///
/// # Example RON
///
/// ```ron
/// RulesConfig(
///     board_size: 13,
///     victory_score: 60,
///     upgrades_enabled: false,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Board edge length in cells.
    pub board_size: i32,
    /// Units each side keeps on the board.
    pub units_on_field: usize,
    /// Deployment cells that become protected home cells.
    pub home_cells_per_side: usize,
    /// Minimum Manhattan distance between a deploy cell and any unit.
    pub deploy_min_distance: u32,
    /// Zone excluded from deployment and favoured by tokens.
    /// Defaults to the centered 3×3 zone.
    pub center_zone: Option<Zone>,
    /// Cycles per phase; cooldowns refresh at each phase boundary.
    pub cycles_per_phase: u32,
    /// Points credited for knocking out an enemy.
    pub kill_bonus: u32,
    /// Score that wins the match.
    pub victory_score: u32,
    /// Cycle cap; the higher score wins when it is reached.
    pub max_cycles: u64,
    /// Whether the upgrade phase runs at phase boundaries.
    pub upgrades_enabled: bool,
    /// Power added by a power upgrade.
    pub upgrade_power_bonus: u32,
    /// Allowance added by an allowance upgrade.
    pub upgrade_allowance_bonus: u32,
    /// Obstacles placed at match start.
    pub blocks: Vec<BlockPlacement>,
    /// Resource nodes on the board.
    pub resource_nodes: Vec<ResourceNode>,
    /// Decision engine weights.
    pub ai_weights: AiWeights,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            units_on_field: 3,
            home_cells_per_side: 3,
            deploy_min_distance: 3,
            center_zone: None,
            cycles_per_phase: 4,
            kill_bonus: DEFAULT_KILL_BONUS,
            victory_score: 60,
            max_cycles: 120,
            upgrades_enabled: true,
            upgrade_power_bonus: 10,
            upgrade_allowance_bonus: 1,
            blocks: vec![
                BlockPlacement {
                    cell: Cell::new(6, 2),
                    integrity: 2,
                },
                BlockPlacement {
                    cell: Cell::new(6, 10),
                    integrity: 2,
                },
                BlockPlacement {
                    cell: Cell::new(2, 6),
                    integrity: 1,
                },
                BlockPlacement {
                    cell: Cell::new(10, 6),
                    integrity: 1,
                },
            ],
            resource_nodes: vec![
                ResourceNode {
                    cell: Cell::new(3, 3),
                    kind: ResourceKind::Wood,
                    trigger: 2,
                },
                ResourceNode {
                    cell: Cell::new(9, 9),
                    kind: ResourceKind::Wood,
                    trigger: 2,
                },
                ResourceNode {
                    cell: Cell::new(3, 9),
                    kind: ResourceKind::Stone,
                    trigger: 5,
                },
                ResourceNode {
                    cell: Cell::new(9, 3),
                    kind: ResourceKind::Stone,
                    trigger: 5,
                },
            ],
            ai_weights: AiWeights::default(),
        }
    }
}

impl RulesConfig {
    /// Rules on a bare board: no blocks, no resource nodes, no upgrades.
    #[must_use]
    pub fn open_board(board_size: i32) -> Self {
        Self {
            board_size,
            blocks: Vec::new(),
            resource_nodes: Vec::new(),
            upgrades_enabled: false,
            ..Self::default()
        }
    }

    /// The zone excluded from deployment.
    #[must_use]
    pub fn center_zone(&self) -> Zone {
        self.center_zone
            .unwrap_or_else(|| Zone::centered(self.board_size, CENTER_ZONE_SPAN))
    }

    /// Parse rules from RON text and validate them.
    pub fn from_ron_str(source_name: &str, text: &str) -> Result<Self> {
        let rules: Self = ron::from_str(text).map_err(|e| GameError::DataParseError {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        rules.validate()?;
        Ok(rules)
    }

    /// Check that the rules describe a playable board.
    pub fn validate(&self) -> Result<()> {
        let in_bounds =
            |cell: Cell| cell.x >= 0 && cell.y >= 0 && cell.x < self.board_size && cell.y < self.board_size;

        if self.board_size < 5 {
            return Err(GameError::InvalidData(format!(
                "board size {} is too small",
                self.board_size
            )));
        }
        if self.units_on_field == 0 || self.cycles_per_phase == 0 || self.victory_score == 0 {
            return Err(GameError::InvalidData(
                "units_on_field, cycles_per_phase and victory_score must be positive".into(),
            ));
        }
        let zone = self.center_zone();
        if !in_bounds(zone.min) || !in_bounds(zone.max) {
            return Err(GameError::InvalidData("center zone leaves the board".into()));
        }
        if let Some(block) = self.blocks.iter().find(|b| !in_bounds(b.cell) || b.integrity == 0) {
            return Err(GameError::InvalidData(format!(
                "invalid block at {:?}",
                block.cell
            )));
        }
        if let Some(node) = self
            .resource_nodes
            .iter()
            .find(|n| !in_bounds(n.cell) || n.trigger == 0 || n.trigger > PRODUCTION_DIE_FACES)
        {
            return Err(GameError::InvalidData(format!(
                "invalid resource node at {:?}",
                node.cell
            )));
        }
        Ok(())
    }
}

/// One unit a side brings to the match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPlacement {
    /// Roster definition id.
    pub definition: String,
    /// Starting cell; `None` starts benched.
    #[serde(default)]
    pub cell: Option<Cell>,
}

impl UnitPlacement {
    /// A unit that starts benched.
    #[must_use]
    pub fn benched(definition: impl Into<String>) -> Self {
        Self {
            definition: definition.into(),
            cell: None,
        }
    }

    /// A unit that starts on `cell`.
    #[must_use]
    pub fn at(definition: impl Into<String>, cell: Cell) -> Self {
        Self {
            definition: definition.into(),
            cell: Some(cell),
        }
    }
}

/// A side's controller and units.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SideSetup {
    /// Who decides for this side.
    #[serde(default)]
    pub controller: Controller,
    /// Units in roster order.
    pub units: Vec<UnitPlacement>,
}

/// Everything needed to create a match besides the roster.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchSetup {
    /// Rules.
    #[serde(default)]
    pub rules: RulesConfig,
    /// Per-side setup, indexed by [`Side::index`].
    pub sides: [SideSetup; 2],
}

impl MatchSetup {
    /// Both sides field the whole standard roster, benched.
    #[must_use]
    pub fn standard(blue: Controller, red: Controller) -> Self {
        let units = || {
            ["gekogekoga", "kidouba", "enshishi", "raichou"]
                .into_iter()
                .map(UnitPlacement::benched)
                .collect::<Vec<_>>()
        };
        Self {
            rules: RulesConfig::default(),
            sides: [
                SideSetup {
                    controller: blue,
                    units: units(),
                },
                SideSetup {
                    controller: red,
                    units: units(),
                },
            ],
        }
    }

    /// Setup of one side.
    #[must_use]
    pub fn side(&self, side: Side) -> &SideSetup {
        &self.sides[side.index()]
    }

    /// Parse a setup from RON text and validate its rules.
    pub fn from_ron_str(source_name: &str, text: &str) -> Result<Self> {
        let setup: Self = ron::from_str(text).map_err(|e| GameError::DataParseError {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        setup.rules.validate()?;
        Ok(setup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_are_valid() {
        let rules = RulesConfig::default();
        rules.validate().unwrap();
        assert_eq!(rules.center_zone(), Zone::centered(13, 3));
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let rules = RulesConfig::from_ron_str("test", "(victory_score: 30, upgrades_enabled: false)").unwrap();
        assert_eq!(rules.victory_score, 30);
        assert!(!rules.upgrades_enabled);
        assert_eq!(rules.board_size, DEFAULT_BOARD_SIZE);
        assert_eq!(rules.blocks.len(), 4);
    }

    #[test]
    fn test_out_of_bounds_block_rejected() {
        let mut rules = RulesConfig::open_board(7);
        rules.blocks.push(BlockPlacement {
            cell: Cell::new(9, 9),
            integrity: 1,
        });
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_tiny_board_rejected() {
        assert!(RulesConfig::open_board(3).validate().is_err());
    }

    #[test]
    fn test_standard_setup() {
        let setup = MatchSetup::standard(Controller::Human, Controller::Ai);
        assert_eq!(setup.side(Side::Blue).units.len(), 4);
        assert!(setup.side(Side::Blue).controller.is_human());
        assert!(!setup.side(Side::Red).controller.is_human());
    }
}
