//! Core types and traits for the Tessera cellular automaton engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary every other Tessera crate speaks: toroidal coordinates
//! and offsets, the dense [`Grid`], the [`Rule`] contract a transition
//! function must satisfy, and the error types shared across layers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod coord;
pub mod error;
pub mod grid;
pub mod rule;

pub use coord::{wrap_axis, Coord, Offset};
pub use error::{GridError, RuleError, StepError};
pub use grid::{Grid, NeighborValues};
pub use rule::{inverse_neighborhood, validate_rule, Rule, RuleProvider};

/// A cell state: a small non-negative integer from a rule-declared alphabet.
pub type CellState = u32;

/// Coordinate → new state, in the order changes were discovered.
///
/// Produced by every generation and by every peer pull. Keys are unique,
/// so merging two diffs is a plain key-union where the later value wins.
pub type CellDiff = indexmap::IndexMap<Coord, CellState>;

/// A set of coordinates with stable iteration order.
pub type CoordSet = indexmap::IndexSet<Coord>;
