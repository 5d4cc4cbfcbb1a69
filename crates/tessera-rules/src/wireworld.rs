//! WireWorld: electrons travelling along conductors.

use tessera_core::{CellState, Offset, Rule};

use crate::MOORE_WITH_SELF;

/// Four-state WireWorld.
///
/// | state | meaning        | next                                          |
/// |-------|----------------|-----------------------------------------------|
/// | 0     | empty          | empty                                         |
/// | 1     | electron head  | electron tail                                 |
/// | 2     | electron tail  | conductor                                     |
/// | 3     | conductor      | head if 1 or 2 neighbours are heads, else conductor |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WireWorld;

impl WireWorld {
    /// Background.
    pub const EMPTY: CellState = 0;
    /// Leading edge of an electron.
    pub const HEAD: CellState = 1;
    /// Trailing edge of an electron.
    pub const TAIL: CellState = 2;
    /// Wire.
    pub const CONDUCTOR: CellState = 3;
}

impl Rule for WireWorld {
    fn name(&self) -> &str {
        "wireworld"
    }

    fn num_states(&self) -> CellState {
        4
    }

    fn neighborhood(&self) -> &[Offset] {
        &MOORE_WITH_SELF
    }

    fn next(&self, values: &[CellState]) -> CellState {
        let Some((&me, neighbours)) = values.split_first() else {
            return Self::EMPTY;
        };
        match me {
            Self::HEAD => Self::TAIL,
            Self::TAIL => Self::CONDUCTOR,
            Self::CONDUCTOR => {
                let heads = neighbours.iter().filter(|&&v| v == Self::HEAD).count();
                if (1..=2).contains(&heads) {
                    Self::HEAD
                } else {
                    Self::CONDUCTOR
                }
            }
            _ => Self::EMPTY,
        }
    }
}
