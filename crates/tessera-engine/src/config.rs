//! Engine and controller configuration, validation, and error types.

use std::error::Error;
use std::fmt;

/// Side length used when no dimension is configured.
pub const DEFAULT_DIMENSION: u32 = 500;

/// Candidate count below which a generation is evaluated serially.
pub const DEFAULT_SERIAL_THRESHOLD: usize = 50;

// ── EngineConfig ───────────────────────────────────────────────────

/// Configuration for a [`GridEngine`](crate::GridEngine).
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Grid side length. Default: 500.
    pub dimension: u32,
    /// Generations with fewer candidates than this are evaluated on the
    /// calling thread; larger ones are split across the worker pool.
    /// Default: 50. Zero sends every generation to the pool.
    pub serial_threshold: usize,
    /// Number of step workers. `None` = one per available processor.
    pub worker_count: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            serial_threshold: DEFAULT_SERIAL_THRESHOLD,
            worker_count: None,
        }
    }
}

impl EngineConfig {
    /// Resolve the actual worker count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, 64]`.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(n) => n.clamp(1, 64),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dimension == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        Ok(())
    }
}

// ── ControllerConfig ───────────────────────────────────────────────

/// Configuration for a [`Controller`](crate::Controller).
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Configuration for every grid the controller allocates.
    pub engine: EngineConfig,
    /// Capacity of the runner's command channel. Default: 64.
    pub command_queue_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            command_queue_capacity: 64,
        }
    }
}

impl ControllerConfig {
    /// Check structural invariants, including the nested engine config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        if self.command_queue_capacity == 0 {
            return Err(ConfigError::CommandQueueZero);
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating configuration or starting threads.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Grid dimension is zero.
    EmptyGrid,
    /// Command queue capacity is zero.
    CommandQueueZero,
    /// A background thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of which thread failed.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "grid dimension must be at least 1"),
            Self::CommandQueueZero => write!(f, "command_queue_capacity must be at least 1"),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
        }
    }
}

impl Error for ConfigError {}
