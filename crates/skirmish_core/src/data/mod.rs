//! Static content tables.
//!
//! Pure data structures describing units and their moves. All structs are
//! designed to be deserialized from RON; the engine treats them as
//! immutable once a match starts.
//!
//! **Note:** This module contains no IO - it only defines data types and
//! parses text handed to it. File loading is handled by `skirmish_headless`.

mod move_data;
mod roster;
mod unit_data;

pub use move_data::{MoveData, MoveEffect, Targeting, MAX_POWER};
pub use roster::RosterData;
pub use unit_data::{Ability, UnitData};
