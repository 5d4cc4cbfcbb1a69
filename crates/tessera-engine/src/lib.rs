//! Simulation engine for Tessera cellular automata.
//!
//! Provides the incremental [`GridEngine`] that recomputes only cells
//! whose neighborhood changed last generation, the persistent
//! [`WorkerPool`] it fans bulk evaluation out to, and the
//! [`Controller`] state machine that owns a grid on a dedicated runner
//! thread and serializes start/stop/step/shutdown requests against it.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod accumulator;
pub mod board;
pub mod config;
pub mod controller;
pub mod error;
pub mod metrics;
pub mod pool;
pub(crate) mod runner;

pub use accumulator::{Accumulator, PeerCache};
pub use board::{ChangedSet, GridEngine};
pub use config::{ConfigError, ControllerConfig, EngineConfig};
pub use controller::{Controller, Operation, SimState};
pub use error::{ControlError, SimulationFault};
pub use metrics::StepMetrics;
pub use pool::WorkerPool;
