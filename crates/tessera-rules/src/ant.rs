//! A ten-state walker rule.
//!
//! State 0 is empty ground and state 5 is a trail mark. States 1..=4
//! are walkers standing on the cell and 6..=9 are walkers arriving from
//! a particular side. Each generation a standing walker leaves a mark
//! behind it, and an arriving walker is picked up by the neighbouring
//! cell it faces.

use tessera_core::{CellState, Offset, Rule};

use crate::VON_NEUMANN_WITH_SELF;

/// The ten-state walker rule over the von Neumann neighborhood.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ant;

impl Ant {
    /// A cell left behind by a walker.
    pub const MARK: CellState = 5;
}

impl Rule for Ant {
    fn name(&self) -> &str {
        "ant"
    }

    fn num_states(&self) -> CellState {
        10
    }

    fn neighborhood(&self) -> &[Offset] {
        &VON_NEUMANN_WITH_SELF
    }

    fn next(&self, values: &[CellState]) -> CellState {
        let [me, east, west, south, north] = match values {
            &[a, b, c, d, e] => [a, b, c, d, e],
            _ => return 0,
        };
        match me {
            1..=4 => Self::MARK,
            6..=9 => 0,
            _ if matches!(east, 2 | 8) => me + 1,
            _ if matches!(west, 3 | 7) => me + 4,
            _ if matches!(south, 1 | 9) => me + 3,
            _ if matches!(north, 4 | 6) => me + 2,
            _ => me,
        }
    }
}
