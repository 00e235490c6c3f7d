//! Unit definitions.

use serde::{Deserialize, Serialize};

use super::MoveData;
use crate::combat::Element;

/// Innate trait a unit definition can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    /// The unit takes on the element of any non-normal move it uses.
    ElementShift,
}

/// Data-driven unit definition.
///
/// # Example RON
///
/// ```ron
/// UnitData(
///     id: "raichou",
///     name: "Raichou",
///     element: Electric,
///     health: 75,
///     moves: [ /* MoveData entries */ ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitData {
    /// Unique string identifier for this unit type.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Starting element.
    #[serde(default)]
    pub element: Element,

    /// Maximum health.
    pub health: u32,

    /// Optional innate trait.
    #[serde(default)]
    pub ability: Option<Ability>,

    /// Move set, in hand order.
    #[serde(default)]
    pub moves: Vec<MoveData>,
}

impl UnitData {
    /// Create a definition without moves.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, element: Element, health: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            element,
            health,
            ability: None,
            moves: Vec::new(),
        }
    }

    /// Attach an ability.
    #[must_use]
    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.ability = Some(ability);
        self
    }

    /// Append a move.
    #[must_use]
    pub fn with_move(mut self, data: MoveData) -> Self {
        self.moves.push(data);
        self
    }

    /// Look up a move by id.
    #[must_use]
    pub fn find_move(&self, id: &str) -> Option<&MoveData> {
        self.moves.iter().find(|m| m.id == id)
    }
}
