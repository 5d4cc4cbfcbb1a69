//! The remote command surface.
//!
//! [`SimulationService`] wraps one [`Controller`] with the reply shapes
//! a transport carries: `init` answers with an ok flag plus error
//! messages, the other commands answer with a plain ok flag, and diffs
//! travel as packed 32-bit words. Pulls go through the peer-cache so a
//! cell that changed and changed back between pulls is never resent.
//!
//! The service is an ordinary owned value; a transport holds it (or an
//! `Arc` of it) and forwards requests.

use std::error::Error;
use std::fmt;

use crossbeam_channel::Receiver;
use tessera_core::{CellState, Coord, Grid, RuleProvider};
use tessera_engine::{ConfigError, ControlError, Controller, ControllerConfig, SimState, SimulationFault};
use tessera_wire::{decode_diff, encode_diff, WireError, MAX_DIMENSION, MAX_STATES};

/// Why a [`SimulationService`] could not be built.
#[derive(Debug, PartialEq, Eq)]
pub enum ServiceError {
    /// The controller configuration was rejected.
    Config(ConfigError),
    /// The grid is larger than the wire encoding can address.
    DimensionTooLarge {
        /// Configured side length.
        dimension: u32,
    },
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "controller configuration: {e}"),
            Self::DimensionTooLarge { dimension } => write!(
                f,
                "grid dimension {dimension} exceeds the wire limit of {MAX_DIMENSION}"
            ),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::DimensionTooLarge { .. } => None,
        }
    }
}

impl From<ConfigError> for ServiceError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Reply to `init`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InitReply {
    /// True if the simulation is now stopped and ready.
    pub ok: bool,
    /// Human-readable reasons for a failure; empty on success.
    pub errors: Vec<String>,
}

impl InitReply {
    fn success() -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
        }
    }

    fn failure(reason: impl fmt::Display) -> Self {
        Self {
            ok: false,
            errors: vec![reason.to_string()],
        }
    }
}

/// One simulation exposed through the remote command surface.
pub struct SimulationService {
    controller: Controller,
    rules: Box<dyn RuleProvider>,
}

impl SimulationService {
    /// Build a service whose `init` sources are resolved by `rules`.
    pub fn new(config: ControllerConfig, rules: impl RuleProvider + 'static) -> Result<Self, ServiceError> {
        if config.engine.dimension > MAX_DIMENSION {
            return Err(ServiceError::DimensionTooLarge {
                dimension: config.engine.dimension,
            });
        }
        Ok(Self {
            controller: Controller::new(config)?,
            rules: Box::new(rules),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SimState {
        self.controller.state()
    }

    /// Current state at `at`, if a grid is allocated.
    pub fn cell(&self, at: Coord) -> Option<CellState> {
        self.controller.cell(at)
    }

    /// Copy of the current grid, if one is allocated.
    pub fn snapshot(&self) -> Option<Grid> {
        self.controller.snapshot()
    }

    /// Most recent runner fault.
    pub fn last_fault(&self) -> Option<SimulationFault> {
        self.controller.last_fault()
    }

    /// Receive every future runner fault.
    pub fn subscribe_faults(&self) -> Receiver<SimulationFault> {
        self.controller.subscribe_faults()
    }

    /// Resolve `source` to a rule and initialise a grid of `default_state`.
    pub fn init(&self, source: &str, default_state: CellState) -> InitReply {
        let rule = match self.rules.resolve(source) {
            Ok(rule) => rule,
            Err(e) => return InitReply::failure(ControlError::RuleBinding(e)),
        };
        if rule.num_states() > MAX_STATES {
            return InitReply::failure(format!(
                "rule '{}' declares {} states; the wire format carries at most {MAX_STATES}",
                rule.name(),
                rule.num_states()
            ));
        }
        match self.controller.init(rule, default_state) {
            Ok(()) => InitReply::success(),
            Err(e) => InitReply::failure(e),
        }
    }

    /// Fresh grid with the previously bound rule.
    pub fn reinit(&self, default_state: CellState) -> bool {
        report("reinit", self.controller.reinit(default_state))
    }

    /// Begin continuous stepping.
    pub fn start(&self) -> bool {
        report("start", self.controller.start())
    }

    /// Halt continuous stepping.
    pub fn stop(&self) -> bool {
        report("stop", self.controller.stop())
    }

    /// Advance one generation.
    pub fn step(&self) -> bool {
        report("step", self.controller.step())
    }

    /// Release the grid.
    pub fn shutdown(&self) -> bool {
        report("shutdown", self.controller.shutdown())
    }

    /// Changes the peer has not seen yet, packed for the wire.
    ///
    /// The peer-cache only records what was packed; after an error the
    /// same changes are offered again by the next pull.
    pub fn pull_changes(&self) -> Result<Vec<i32>, WireError> {
        self.controller.pull_peer_diff_with(encode_diff)
    }

    /// Apply packed changes from the peer. Legal only while stopped.
    pub fn push_changes(&self, words: &[i32]) -> bool {
        let diff = decode_diff(words);
        report("push_changes", self.controller.push_changes(&diff))
    }
}

fn report(command: &str, result: Result<(), ControlError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(command, error = %e, "command failed");
            false
        }
    }
}
