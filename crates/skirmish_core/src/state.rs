//! The match state.
//!
//! [`MatchState`] owns everything about one match: both rosters, the
//! territory grid, blocks, tokens, resources, the phase machine, plans, the
//! resolution queue and the event log. It is mutated only through the entry
//! points in [`crate::engine`]; this module holds construction, read-only
//! accessors, shared queries and persistence.
//!
//! # Determinism
//!
//! - Units and blocks live in `BTreeMap`s and are always visited in id order
//! - Randomness comes only from the [`RandomSource`](crate::rng::RandomSource)
//!   passed into an entry point
//! - Scores and AI evaluations use integer or fixed-point math

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::actions::{PlannedAction, QueuedAction, SchedulerStatus, SidePlan, UpgradeStatus};
use crate::blocks::{Block, BlockId};
use crate::config::{MatchSetup, RulesConfig};
use crate::data::{Ability, RosterData};
use crate::error::{GameError, Result};
use crate::events::{EventLog, MatchEvent};
use crate::math::Cell;
use crate::resources::{ResourceCost, ResourceNode, Stockpile};
use crate::side::{Controller, Side};
use crate::territory::TerritoryGrid;
use crate::tokens::TokenField;
use crate::units::{UnitId, UnitInstance};

/// Phase of the match state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Sides take turns placing units.
    Deploy,
    /// Sides choose actions.
    Planning,
    /// The queue is being resolved.
    Resolution,
    /// Sides improve one move each.
    Upgrade,
}

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// One side won.
    Winner(Side),
    /// Equal scores at the cycle cap.
    Draw,
}

impl MatchOutcome {
    /// The winning side, if any.
    #[must_use]
    pub const fn winner(self) -> Option<Side> {
        match self {
            Self::Winner(side) => Some(side),
            Self::Draw => None,
        }
    }
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Winner(side) => write!(f, "{side} wins"),
            Self::Draw => f.write_str("draw"),
        }
    }
}

/// Complete state of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub(crate) rules: RulesConfig,
    pub(crate) controllers: [Controller; 2],
    pub(crate) units: BTreeMap<UnitId, UnitInstance>,
    /// Units whose element follows the moves they use.
    pub(crate) element_shifters: BTreeSet<UnitId>,
    pub(crate) territory: TerritoryGrid,
    pub(crate) blocks: BTreeMap<BlockId, Block>,
    pub(crate) tokens: TokenField,
    pub(crate) resource_nodes: Vec<ResourceNode>,
    pub(crate) stockpiles: [Stockpile; 2],
    pub(crate) phase: Phase,
    pub(crate) phase_number: u32,
    pub(crate) cycle_in_phase: u32,
    pub(crate) cycle: u64,
    pub(crate) deploy_turn: Option<Side>,
    pub(crate) plans: [SidePlan; 2],
    pub(crate) upgrades: [UpgradeStatus; 2],
    pub(crate) queue: VecDeque<QueuedAction>,
    pub(crate) status: SchedulerStatus,
    /// Points from kills and tokens; territory is added on top.
    pub(crate) banked: [u32; 2],
    pub(crate) outcome: Option<MatchOutcome>,
    pub(crate) next_sequence: u64,
    pub(crate) log: EventLog,
}

impl MatchState {
    /// Create a match from a setup and a roster.
    ///
    /// Units start benched unless the setup gives them a cell. The match
    /// opens in the deploy phase when any side still has units to place,
    /// otherwise in planning. AI deploy turns are taken immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the rules are invalid, a unit definition is
    /// missing from the roster, or a starting cell is illegal.
    pub fn new(setup: &MatchSetup, roster: &RosterData) -> Result<Self> {
        let rules = setup.rules.clone();
        rules.validate()?;

        let mut territory = TerritoryGrid::new(rules.board_size);
        let mut units = BTreeMap::new();
        let mut element_shifters = BTreeSet::new();
        let mut next_id: UnitId = 1;

        for side in Side::ALL {
            for placement in &setup.side(side).units {
                let data = roster
                    .get(&placement.definition)
                    .ok_or_else(|| GameError::UnknownDefinition(placement.definition.clone()))?;
                let mut unit = UnitInstance::from_data(next_id, side, data);
                if data.ability == Some(Ability::ElementShift) {
                    element_shifters.insert(next_id);
                }
                if let Some(cell) = placement.cell {
                    let taken = units
                        .values()
                        .any(|u: &UnitInstance| u.position == Some(cell));
                    if !territory.in_bounds(cell) || taken {
                        return Err(GameError::InvalidData(format!(
                            "illegal starting cell {cell:?} for {}",
                            placement.definition
                        )));
                    }
                    unit.position = Some(cell);
                    if territory.home_cells(side).len() < rules.home_cells_per_side {
                        territory.register_home(cell, side);
                    } else {
                        territory.paint(cell, side);
                    }
                }
                units.insert(next_id, unit);
                next_id += 1;
            }
        }

        let mut blocks = BTreeMap::new();
        for (index, placement) in rules.blocks.iter().enumerate() {
            let id = index as BlockId + 1;
            blocks.insert(id, Block::new(id, placement.cell, placement.integrity));
        }
        if let Some(unit) = units
            .values()
            .find(|u| u.position.is_some_and(|cell| rules.blocks.iter().any(|b| b.cell == cell)))
        {
            return Err(GameError::InvalidData(format!(
                "{} starts on a block",
                unit.definition
            )));
        }

        let mut state = Self {
            controllers: [setup.sides[0].controller, setup.sides[1].controller],
            units,
            element_shifters,
            territory,
            blocks,
            tokens: TokenField::default(),
            resource_nodes: rules.resource_nodes.clone(),
            stockpiles: [Stockpile::default(); 2],
            phase: Phase::Deploy,
            phase_number: 1,
            cycle_in_phase: 1,
            cycle: 1,
            deploy_turn: None,
            plans: Default::default(),
            upgrades: Default::default(),
            queue: VecDeque::new(),
            status: SchedulerStatus::Idle,
            banked: [0; 2],
            outcome: None,
            next_sequence: 0,
            log: EventLog::default(),
            rules,
        };

        tracing::info!(
            units = state.units.len(),
            board = state.rules.board_size,
            "Match created"
        );
        state.enter_deploy_or_planning();
        state.run_ai_deploys();
        Ok(state)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Rules in force.
    #[must_use]
    pub const fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// Controller of a side.
    #[must_use]
    pub const fn controller(&self, side: Side) -> Controller {
        self.controllers[side.index()]
    }

    /// Territory grid.
    #[must_use]
    pub const fn territory(&self) -> &TerritoryGrid {
        &self.territory
    }

    /// All units in id order.
    pub fn units(&self) -> impl Iterator<Item = &UnitInstance> {
        self.units.values()
    }

    /// Units of one side in id order.
    pub fn units_of(&self, side: Side) -> impl Iterator<Item = &UnitInstance> {
        self.units.values().filter(move |u| u.side == side)
    }

    /// Units of one side standing on the board.
    pub fn on_board(&self, side: Side) -> impl Iterator<Item = &UnitInstance> {
        self.units_of(side).filter(|u| u.is_on_board())
    }

    /// Look up a unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&UnitInstance> {
        self.units.get(&id)
    }

    /// Whether the unit's element follows the moves it uses.
    #[must_use]
    pub fn is_element_shifter(&self, id: UnitId) -> bool {
        self.element_shifters.contains(&id)
    }

    /// Blocks in id order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// Look up a block.
    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    /// Active and pending tokens.
    #[must_use]
    pub const fn tokens(&self) -> &TokenField {
        &self.tokens
    }

    /// Resource nodes.
    #[must_use]
    pub fn resource_nodes(&self) -> &[ResourceNode] {
        &self.resource_nodes
    }

    /// A side's resources.
    #[must_use]
    pub const fn stockpile(&self, side: Side) -> Stockpile {
        self.stockpiles[side.index()]
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Phase counter, starting at 1.
    #[must_use]
    pub const fn phase_number(&self) -> u32 {
        self.phase_number
    }

    /// Cycle within the current phase, starting at 1.
    #[must_use]
    pub const fn cycle_in_phase(&self) -> u32 {
        self.cycle_in_phase
    }

    /// Cycle counter across the match, starting at 1.
    #[must_use]
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Side whose turn it is to deploy.
    #[must_use]
    pub const fn deploy_turn(&self) -> Option<Side> {
        self.deploy_turn
    }

    /// A side's plan for this cycle.
    #[must_use]
    pub const fn plan(&self, side: Side) -> &SidePlan {
        &self.plans[side.index()]
    }

    /// A side's upgrade progress.
    #[must_use]
    pub const fn upgrade_status(&self, side: Side) -> &UpgradeStatus {
        &self.upgrades[side.index()]
    }

    /// Actions still queued behind the one being resolved.
    #[must_use]
    pub const fn pending_actions(&self) -> &VecDeque<QueuedAction> {
        &self.queue
    }

    /// The action suspended for target input.
    #[must_use]
    pub const fn current_resolving_action(&self) -> Option<&QueuedAction> {
        self.status.awaiting()
    }

    /// Scheduler status.
    #[must_use]
    pub const fn scheduler_status(&self) -> &SchedulerStatus {
        &self.status
    }

    /// Points from kills and tokens.
    #[must_use]
    pub const fn banked(&self, side: Side) -> u32 {
        self.banked[side.index()]
    }

    /// Total score: banked points plus owned cells.
    #[must_use]
    pub fn score(&self, side: Side) -> u32 {
        self.banked[side.index()] + self.territory.count(side)
    }

    /// Both totals, indexed by [`Side::index`].
    #[must_use]
    pub fn scores(&self) -> [u32; 2] {
        [self.score(Side::Blue), self.score(Side::Red)]
    }

    /// Result, once the match is over.
    #[must_use]
    pub const fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }

    /// Whether the match is over.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Event log.
    #[must_use]
    pub const fn log(&self) -> &EventLog {
        &self.log
    }

    // ------------------------------------------------------------------
    // Shared queries
    // ------------------------------------------------------------------

    /// Unit standing on `cell`.
    #[must_use]
    pub fn unit_at(&self, cell: Cell) -> Option<&UnitInstance> {
        self.units.values().find(|u| u.position == Some(cell))
    }

    /// Block standing on `cell`.
    #[must_use]
    pub fn block_at(&self, cell: Cell) -> Option<&Block> {
        self.blocks.values().find(|b| b.cell == cell)
    }

    /// Cells a moving unit may cross but not stop on: every other unit and
    /// every block.
    #[must_use]
    pub fn occupied_cells(&self, except: Option<UnitId>) -> BTreeSet<Cell> {
        self.units
            .values()
            .filter(|u| Some(u.id) != except)
            .filter_map(|u| u.position)
            .chain(self.blocks.values().map(|b| b.cell))
            .collect()
    }

    /// Cells held by a side's on-board units.
    #[must_use]
    pub fn unit_cells(&self, side: Side) -> BTreeSet<Cell> {
        self.on_board(side).filter_map(|u| u.position).collect()
    }

    /// Resources a side's plan will need if every card resolves.
    ///
    /// Alternate plays are free; first use of a move is free.
    #[must_use]
    pub fn planned_cost(&self, side: Side) -> ResourceCost {
        self.plans[side.index()]
            .entries
            .iter()
            .filter_map(|entry| match &entry.action {
                PlannedAction::PlayMove(play) if !play.alternate => {
                    let unit = self.units.get(&play.unit)?;
                    let slot = unit.move_slot(&play.move_id)?;
                    Some(unit.price_of(slot))
                }
                PlannedAction::PlayMove(_) | PlannedAction::Guard(_) => None,
            })
            .fold(ResourceCost::FREE, ResourceCost::plus)
    }

    pub(crate) fn unit_mut(&mut self, id: UnitId) -> Option<&mut UnitInstance> {
        self.units.get_mut(&id)
    }

    pub(crate) fn push_event(&mut self, event: MatchEvent) {
        self.log.push(self.cycle, event);
    }

    pub(crate) fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Calculate a hash of the current match state.
    ///
    /// Two matches fed the same inputs and random stream produce the same
    /// hash. The event log is not included.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.phase.hash(&mut hasher);
        self.phase_number.hash(&mut hasher);
        self.cycle.hash(&mut hasher);
        self.cycle_in_phase.hash(&mut hasher);
        self.deploy_turn.hash(&mut hasher);

        for (id, unit) in &self.units {
            id.hash(&mut hasher);
            unit.hash(&mut hasher);
        }
        self.territory.hash(&mut hasher);
        for block in self.blocks.values() {
            block.hash(&mut hasher);
        }
        self.tokens.hash(&mut hasher);
        self.stockpiles.hash(&mut hasher);
        self.plans.hash(&mut hasher);
        self.upgrades.hash(&mut hasher);
        self.queue.hash(&mut hasher);
        self.status.hash(&mut hasher);
        self.banked.hash(&mut hasher);
        self.outcome.hash(&mut hasher);
        self.next_sequence.hash(&mut hasher);

        hasher.finish()
    }

    /// Serialize the full state, including the queue and any suspended
    /// action.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize match: {e}")))
    }

    /// Restore a state produced by [`serialize`](Self::serialize).
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid snapshot.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize match: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SideSetup, UnitPlacement};

    fn placed_setup() -> MatchSetup {
        let mut setup = MatchSetup::standard(Controller::Human, Controller::Human);
        setup.rules = RulesConfig::open_board(9);
        setup.sides[0].units = vec![
            UnitPlacement::at("raichou", Cell::new(0, 0)),
            UnitPlacement::benched("kidouba"),
        ];
        setup.sides[1] = SideSetup {
            controller: Controller::Human,
            units: vec![UnitPlacement::at("enshishi", Cell::new(8, 8))],
        };
        setup
    }

    #[test]
    fn test_new_assigns_ids_and_homes() {
        let state = MatchState::new(&placed_setup(), &RosterData::standard()).unwrap();
        let ids: Vec<UnitId> = state.units().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(state.unit(1).unwrap().position, Some(Cell::new(0, 0)));
        assert_eq!(state.territory().home_of(Cell::new(0, 0)), Some(Side::Blue));
        assert_eq!(state.territory().home_of(Cell::new(8, 8)), Some(Side::Red));
        assert_eq!(state.score(Side::Blue), 1);
    }

    #[test]
    fn test_unknown_definition_rejected() {
        let mut setup = placed_setup();
        setup.sides[1].units.push(UnitPlacement::benched("missingno"));
        let err = MatchState::new(&setup, &RosterData::standard()).unwrap_err();
        assert!(matches!(err, GameError::UnknownDefinition(_)));
    }

    #[test]
    fn test_duplicate_start_cell_rejected() {
        let mut setup = placed_setup();
        setup.sides[1].units.push(UnitPlacement::at("raichou", Cell::new(0, 0)));
        assert!(MatchState::new(&setup, &RosterData::standard()).is_err());
    }

    #[test]
    fn test_element_shifters_side_table() {
        let mut setup = placed_setup();
        setup.sides[0].units.push(UnitPlacement::benched("gekogekoga"));
        let state = MatchState::new(&setup, &RosterData::standard()).unwrap();
        let shifter = state
            .units()
            .find(|u| u.definition == "gekogekoga")
            .unwrap()
            .id;
        assert!(state.is_element_shifter(shifter));
        assert!(!state.is_element_shifter(1));
    }

    #[test]
    fn test_serialize_roundtrip_preserves_hash() {
        let state = MatchState::new(&placed_setup(), &RosterData::standard()).unwrap();
        let bytes = state.serialize().unwrap();
        let restored = MatchState::deserialize(&bytes).unwrap();
        assert_eq!(restored, state);
        assert_eq!(restored.state_hash(), state.state_hash());
    }

    #[test]
    fn test_occupied_cells_include_blocks() {
        let mut setup = placed_setup();
        setup.rules.blocks.push(crate::blocks::BlockPlacement {
            cell: Cell::new(4, 4),
            integrity: 1,
        });
        let state = MatchState::new(&setup, &RosterData::standard()).unwrap();
        let occupied = state.occupied_cells(Some(1));
        assert!(occupied.contains(&Cell::new(4, 4)));
        assert!(occupied.contains(&Cell::new(8, 8)));
        assert!(!occupied.contains(&Cell::new(0, 0)));
    }
}
