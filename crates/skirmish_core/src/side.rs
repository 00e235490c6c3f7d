//! Side identifiers and controllers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two opposing sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// Deploys first and advances towards the east edge.
    Blue,
    /// Advances towards the west edge.
    Red,
}

impl Side {
    /// Both sides in resolution order.
    pub const ALL: [Self; 2] = [Self::Blue, Self::Red];

    /// The opposing side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Blue => Self::Red,
            Self::Red => Self::Blue,
        }
    }

    /// Index into per-side arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Blue => 0,
            Self::Red => 1,
        }
    }

    /// Get the display name for this side.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Blue => "Blue",
            Self::Red => "Red",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Who makes the decisions for a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Controller {
    /// Decisions arrive through the public entry points.
    Human,
    /// Decisions come from the heuristic decision engine.
    #[default]
    Ai,
}

impl Controller {
    /// Whether this controller waits on external input.
    #[must_use]
    pub const fn is_human(self) -> bool {
        matches!(self, Self::Human)
    }
}
