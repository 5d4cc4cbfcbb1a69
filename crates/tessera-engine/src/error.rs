//! Controller error and fault types.
//!
//! Command-level failures ([`ControlError`]) are local and recoverable.
//! A [`SimulationFault`] is fatal to the running simulation: the
//! controller shuts it down and reports the fault, but stays usable for
//! a fresh `init`.

use std::error::Error;
use std::fmt;

use tessera_core::{CellState, Coord, GridError, RuleError, StepError};

use crate::config::ConfigError;
use crate::controller::{Operation, SimState};

/// Why a simulation was forcibly shut down.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimulationFault {
    /// The rule produced a state outside its declared alphabet.
    OutOfRange {
        /// First offending cell found.
        coord: Coord,
        /// The value the rule returned.
        value: CellState,
        /// The rule's declared alphabet size.
        num_states: CellState,
    },
    /// A generation could not be computed (rule panic, lost worker).
    StepFailed(StepError),
}

impl fmt::Display for SimulationFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange {
                coord,
                value,
                num_states,
            } => write!(
                f,
                "rule produced state {value} at {coord}, outside [0, {num_states})"
            ),
            Self::StepFailed(e) => write!(f, "step failed: {e}"),
        }
    }
}

impl Error for SimulationFault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StepFailed(e) => Some(e),
            Self::OutOfRange { .. } => None,
        }
    }
}

/// Errors returned by [`Controller`](crate::Controller) commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlError {
    /// The command is not legal in the current state.
    IllegalTransition {
        /// The rejected command.
        operation: Operation,
        /// The state it was issued from.
        state: SimState,
    },
    /// No rule could be obtained or the rule is malformed.
    RuleBinding(RuleError),
    /// `reinit` was called before any rule was bound.
    NoRuleBound,
    /// An external edit or default state was rejected.
    Grid(GridError),
    /// The grid engine could not be built.
    Config(String),
    /// The simulation faulted while this command was in flight.
    Faulted(SimulationFault),
    /// The runner thread is gone.
    RunnerGone,
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IllegalTransition { operation, state } => {
                write!(f, "{operation} is not legal while {state}")
            }
            Self::RuleBinding(e) => write!(f, "rule binding failed: {e}"),
            Self::NoRuleBound => write!(f, "no rule bound; call init first"),
            Self::Grid(e) => write!(f, "grid: {e}"),
            Self::Config(reason) => write!(f, "engine configuration: {reason}"),
            Self::Faulted(fault) => write!(f, "simulation faulted: {fault}"),
            Self::RunnerGone => write!(f, "runner thread has exited"),
        }
    }
}

impl Error for ControlError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::RuleBinding(e) => Some(e),
            Self::Grid(e) => Some(e),
            Self::Faulted(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RuleError> for ControlError {
    fn from(e: RuleError) -> Self {
        Self::RuleBinding(e)
    }
}

impl From<GridError> for ControlError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl From<ConfigError> for ControlError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<SimulationFault> for ControlError {
    fn from(e: SimulationFault) -> Self {
        Self::Faulted(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn illegal_transition_display() {
        let e = ControlError::IllegalTransition {
            operation: Operation::Step,
            state: SimState::Running,
        };
        assert_eq!(e.to_string(), "step is not legal while running");
    }

    #[test]
    fn fault_source_chain() {
        let e = ControlError::Faulted(SimulationFault::StepFailed(StepError::RuleNotBound));
        let fault = e.source().unwrap();
        assert!(fault.source().is_some());
    }
}
