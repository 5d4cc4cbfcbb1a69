//! Per-generation performance metrics for the grid engine.

/// Work and timing data for the most recent generation.
///
/// The engine overwrites this after every `step()`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Cells evaluated this generation.
    pub candidates: usize,
    /// Cells whose state changed.
    pub changed: usize,
    /// Whether evaluation was dispatched to the worker pool.
    pub parallel: bool,
    /// Wall-clock time for the whole step, in microseconds.
    pub elapsed_us: u64,
}
