//! Built-in transition rules for Tessera.
//!
//! - [`LifeLike`]: two-state outer-totalistic rules written as `B3/S23`
//!   rulestrings, Conway's Life among them.
//! - [`WireWorld`]: four-state electron circuits.
//! - [`Ant`]: a ten-state rule whose walkers leave a trail as they turn.
//!
//! [`RuleRegistry`] resolves a rule source, either a registered name or
//! a rulestring, into a shareable rule.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod ant;
pub mod life;
pub mod registry;
pub mod wireworld;

pub use ant::Ant;
pub use life::LifeLike;
pub use registry::RuleRegistry;
pub use wireworld::WireWorld;

use tessera_core::Offset;

/// The cell itself followed by its eight Moore neighbours.
///
/// Rules that use it receive the cell's own state at index 0.
pub const MOORE_WITH_SELF: [Offset; 9] = [
    Offset::ORIGIN,
    Offset::new(0, 1),
    Offset::new(0, -1),
    Offset::new(1, 0),
    Offset::new(1, 1),
    Offset::new(1, -1),
    Offset::new(-1, 0),
    Offset::new(-1, 1),
    Offset::new(-1, -1),
];

/// The cell itself followed by its four von Neumann neighbours:
/// east, west, south, north.
pub const VON_NEUMANN_WITH_SELF: [Offset; 5] = [
    Offset::ORIGIN,
    Offset::new(0, 1),
    Offset::new(0, -1),
    Offset::new(1, 0),
    Offset::new(-1, 0),
];
