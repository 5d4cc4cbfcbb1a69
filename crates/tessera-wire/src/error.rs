//! Errors for the wire encoding.

use std::error::Error;
use std::fmt;
use std::io;

use tessera_core::{CellState, Coord};

use crate::{MAX_DIMENSION, MAX_STATES};

/// A value that cannot be represented in, or read from, the wire format.
#[derive(Debug)]
pub enum WireError {
    /// A coordinate component is at or above [`MAX_DIMENSION`].
    CoordTooLarge {
        /// The coordinate that does not fit.
        coord: Coord,
    },
    /// A state is at or above [`MAX_STATES`].
    StateTooLarge {
        /// Where the state was found.
        coord: Coord,
        /// The state that does not fit.
        value: CellState,
    },
    /// The underlying reader or writer failed.
    Io(io::Error),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CoordTooLarge { coord } => write!(
                f,
                "coordinate {coord} exceeds the encodable range [0, {MAX_DIMENSION})"
            ),
            Self::StateTooLarge { coord, value } => write!(
                f,
                "state {value} at {coord} exceeds the encodable range [0, {MAX_STATES})"
            ),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl Error for WireError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WireError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
