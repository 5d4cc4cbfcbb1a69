//! Tessera: an incremental cellular automaton engine on a toroidal grid.
//!
//! This is the top-level facade crate that re-exports the public API of
//! the Tessera sub-crates and adds [`SimulationService`], the
//! boolean/packed-word command surface a network transport binds to.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use tessera::prelude::*;
//!
//! let config = ControllerConfig {
//!     engine: EngineConfig { dimension: 32, ..EngineConfig::default() },
//!     ..ControllerConfig::default()
//! };
//! let controller = Controller::new(config).unwrap();
//! controller.init(Arc::new(LifeLike::conway()), 0).unwrap();
//!
//! let blinker: CellDiff = [(5, 4), (5, 5), (5, 6)]
//!     .into_iter()
//!     .map(|(r, c)| (Coord::new(r, c), 1))
//!     .collect();
//! controller.push_changes(&blinker).unwrap();
//! controller.step().unwrap();
//!
//! assert_eq!(controller.cell(Coord::new(4, 5)), Some(1));
//! assert_eq!(controller.cell(Coord::new(5, 4)), Some(0));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tessera-core` | Coordinates, grid, the `Rule` contract, shared errors |
//! | [`engine`] | `tessera-engine` | Grid engine, worker pool, controller |
//! | [`rules`] | `tessera-rules` | Built-in rules and the rule registry |
//! | [`wire`] | `tessera-wire` | Packed 32-bit diff encoding |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and traits (`tessera-core`).
pub use tessera_core as types;

/// Grid engine, worker pool, and controller (`tessera-engine`).
pub use tessera_engine as engine;

/// Built-in rules and the [`rules::RuleRegistry`] (`tessera-rules`).
pub use tessera_rules as rules;

/// Packed diff encoding (`tessera-wire`).
pub use tessera_wire as wire;

pub mod service;

pub use service::{InitReply, ServiceError, SimulationService};

/// Common imports for typical Tessera usage.
pub mod prelude {
    pub use tessera_core::{
        CellDiff, CellState, Coord, Grid, Offset, Rule, RuleError, RuleProvider,
    };

    pub use tessera_engine::{
        ControlError, Controller, ControllerConfig, EngineConfig, SimState, SimulationFault,
        StepMetrics,
    };

    pub use tessera_rules::{Ant, LifeLike, RuleRegistry, WireWorld};

    pub use crate::service::{InitReply, SimulationService};
}
