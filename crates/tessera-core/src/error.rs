//! Error types shared by every Tessera layer.
//!
//! Organized by subsystem: grid access, rule construction, and
//! generation stepping.

use std::error::Error;
use std::fmt;

use crate::coord::Coord;
use crate::CellState;

/// Errors from direct grid access and external edits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    /// A coordinate lies outside the `dimension × dimension` grid.
    CoordOutOfBounds {
        /// The offending coordinate.
        coord: Coord,
        /// Side length of the grid.
        dimension: u32,
    },
    /// A state lies outside the rule's alphabet `[0, num_states)`.
    StateOutOfRange {
        /// Where the value was to be written.
        coord: Coord,
        /// The offending value.
        value: CellState,
        /// Size of the rule's alphabet.
        num_states: CellState,
    },
    /// Attempted to allocate a grid with zero cells.
    EmptyGrid,
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CoordOutOfBounds { coord, dimension } => {
                write!(f, "coordinate {coord} outside [0, {dimension})^2")
            }
            Self::StateOutOfRange {
                coord,
                value,
                num_states,
            } => write!(
                f,
                "state {value} at {coord} outside alphabet [0, {num_states})"
            ),
            Self::EmptyGrid => write!(f, "grid must have at least one cell"),
        }
    }
}

impl Error for GridError {}

/// Errors raised while obtaining or validating a transition rule.
///
/// Rule providers (registries, compilers) return these; the controller
/// wraps them so `init` can report a descriptive failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleError {
    /// The rule declares no neighborhood offsets.
    EmptyNeighborhood,
    /// The rule declares an empty state alphabet.
    NoStates,
    /// No rule is known under the requested source.
    Unknown {
        /// The rule source that could not be resolved.
        source: String,
    },
    /// The rule source was recognised but malformed.
    Invalid {
        /// What went wrong.
        reason: String,
    },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyNeighborhood => write!(f, "rule neighborhood is empty"),
            Self::NoStates => write!(f, "rule declares zero states"),
            Self::Unknown { source } => write!(f, "unknown rule '{source}'"),
            Self::Invalid { reason } => write!(f, "invalid rule: {reason}"),
        }
    }
}

impl Error for RuleError {}

/// Errors from a single generation step.
///
/// Every variant is fatal to the simulation instance that produced it;
/// none is retried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepError {
    /// `step()` was called before a rule was bound.
    RuleNotBound,
    /// The rule panicked while evaluating a cell.
    RuleFailed {
        /// Panic payload, when it was a string.
        reason: String,
    },
    /// A worker thread disappeared before reporting its slice.
    WorkerLost {
        /// Index of the lost worker.
        worker: usize,
    },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RuleNotBound => write!(f, "step called before a rule was bound"),
            Self::RuleFailed { reason } => write!(f, "rule evaluation failed: {reason}"),
            Self::WorkerLost { worker } => write!(f, "step worker {worker} exited unexpectedly"),
        }
    }
}

impl Error for StepError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_error_display_names_coord() {
        let e = GridError::CoordOutOfBounds {
            coord: Coord::new(12, 3),
            dimension: 10,
        };
        assert_eq!(e.to_string(), "coordinate (12, 3) outside [0, 10)^2");
    }

    #[test]
    fn step_error_display() {
        let e = StepError::RuleFailed {
            reason: "boom".into(),
        };
        assert!(e.to_string().contains("boom"));
        assert_eq!(
            StepError::WorkerLost { worker: 2 }.to_string(),
            "step worker 2 exited unexpectedly"
        );
    }
}
