//! Proptest strategies.
//!
//! Random but reproducible inputs for property-based tests of the engine.

use proptest::prelude::*;
use skirmish_core::combat::Element;
use skirmish_core::math::Cell;
use skirmish_core::side::Side;
use skirmish_core::territory::TerritoryGrid;

/// A cell inside a `size`×`size` board.
pub fn arb_cell(size: i32) -> impl Strategy<Value = Cell> {
    (0..size, 0..size).prop_map(|(x, y)| Cell::new(x, y))
}

/// Either side.
pub fn arb_side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Blue), Just(Side::Red)]
}

/// Any element.
pub fn arb_element() -> impl Strategy<Value = Element> {
    proptest::sample::select(Element::ALL.to_vec())
}

/// A move power in the roster's range.
pub fn arb_power() -> impl Strategy<Value = u32> {
    0u32..=200
}

/// A seed for the match random stream.
pub fn arb_seed() -> impl Strategy<Value = u64> {
    any::<u64>()
}

/// A `size`×`size` grid with scattered paint for both sides.
pub fn arb_painted_grid(size: i32) -> impl Strategy<Value = TerritoryGrid> {
    let cells = (size * size) as usize;
    proptest::collection::vec(prop_oneof![Just(None), arb_side().prop_map(Some)], cells).prop_map(
        move |owners| {
            let mut grid = TerritoryGrid::new(size);
            for (index, owner) in owners.into_iter().enumerate() {
                if let Some(side) = owner {
                    let index = index as i32;
                    grid.paint(Cell::new(index % size, index / size), side);
                }
            }
            grid
        },
    )
}
