//! Benchmark profiles for the Tessera engine.
//!
//! - [`reference_profile`]: the default 500×500 grid seeded with a Life soup
//! - [`small_profile`]: 128×128 for quick iterations

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::error::Error;
use std::sync::Arc;

use tessera_core::{CellDiff, Rule};
use tessera_engine::{EngineConfig, GridEngine};
use tessera_rules::LifeLike;
use tessera_test_utils::random_soup;

/// Soup density used by every profile, in percent.
pub const SOUP_DENSITY: u32 = 30;

/// A bound Life engine on the default 500×500 grid with a seeded soup applied.
pub fn reference_profile(seed: u64) -> Result<GridEngine, Box<dyn Error>> {
    profile(EngineConfig::default(), seed)
}

/// Same as [`reference_profile`] on a 128×128 grid.
pub fn small_profile(seed: u64) -> Result<GridEngine, Box<dyn Error>> {
    profile(
        EngineConfig {
            dimension: 128,
            ..EngineConfig::default()
        },
        seed,
    )
}

/// A bound Life engine for `config` with a seeded soup applied.
pub fn profile(config: EngineConfig, seed: u64) -> Result<GridEngine, Box<dyn Error>> {
    let mut engine = GridEngine::new(&config, 0)?;
    let life: Arc<dyn Rule> = Arc::new(LifeLike::conway());
    engine.bind(life)?;
    engine.apply_external_changes(&soup(config.dimension, seed))?;
    Ok(engine)
}

/// A seeded two-state soup for a `dimension`-square grid.
pub fn soup(dimension: u32, seed: u64) -> CellDiff {
    random_soup(seed, dimension, 2, SOUP_DENSITY)
}
