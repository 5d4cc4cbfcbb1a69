//! The incremental grid stepper.
//!
//! Only cells whose neighborhood contained a cell that changed in the
//! previous generation can change in this one, so after the first
//! full-grid scan each generation evaluates just the image of the last
//! changed-set under the inverse neighborhood. This is sound only for
//! rules that are pure functions of their declared neighborhood (see
//! the [`Rule`] contract).

use std::sync::Arc;
use std::time::Instant;

use tessera_core::rule::validate_rule;
use tessera_core::{
    inverse_neighborhood, CellDiff, CellState, Coord, CoordSet, Grid, GridError, Offset, Rule,
    RuleError, StepError,
};

use crate::config::{ConfigError, EngineConfig};
use crate::metrics::StepMetrics;
use crate::pool::{evaluate_guarded, WorkerPool};

/// Cells that changed in the previous generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangedSet {
    /// No generation has run yet; the next step scans every cell.
    Unknown,
    /// Exactly these cells changed last generation (possibly none).
    Known(CoordSet),
}

struct BoundRule {
    rule: Arc<dyn Rule>,
    inverse: Vec<Offset>,
}

/// Owns the grid and advances it one generation at a time.
pub struct GridEngine {
    grid: Arc<Grid>,
    bound: Option<BoundRule>,
    changed: ChangedSet,
    pool: WorkerPool,
    serial_threshold: usize,
    metrics: StepMetrics,
}

impl GridEngine {
    /// Allocate a grid filled with `default_state` and start the worker pool.
    pub fn new(config: &EngineConfig, default_state: CellState) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = Grid::new(config.dimension, default_state).map_err(|_| ConfigError::EmptyGrid)?;
        let pool = WorkerPool::new(config.resolved_worker_count())?;
        Ok(Self {
            grid: Arc::new(grid),
            bound: None,
            changed: ChangedSet::Unknown,
            pool,
            serial_threshold: config.serial_threshold,
            metrics: StepMetrics::default(),
        })
    }

    /// Reallocate the grid at `dimension`, fill it with `default_state`,
    /// and forget the changed-set. The bound rule and pool are kept.
    pub fn initialize(&mut self, dimension: u32, default_state: CellState) -> Result<(), GridError> {
        self.grid = Arc::new(Grid::new(dimension, default_state)?);
        self.changed = ChangedSet::Unknown;
        self.metrics = StepMetrics::default();
        Ok(())
    }

    /// Attach `rule` and precompute its inverse neighborhood.
    ///
    /// Must be called before [`step`](Self::step).
    pub fn bind(&mut self, rule: Arc<dyn Rule>) -> Result<(), RuleError> {
        validate_rule(rule.as_ref())?;
        if !rule.neighborhood().contains(&Offset::ORIGIN) {
            tracing::warn!(
                rule = rule.name(),
                "neighborhood lacks the zero offset; a cell's own state will not affect it"
            );
        }
        let inverse = inverse_neighborhood(rule.neighborhood());
        self.bound = Some(BoundRule { rule, inverse });
        Ok(())
    }

    /// The bound rule, if any.
    pub fn rule(&self) -> Option<&Arc<dyn Rule>> {
        self.bound.as_ref().map(|b| &b.rule)
    }

    /// Side length of the grid.
    pub fn dimension(&self) -> u32 {
        self.grid.dimension()
    }

    /// Read-only view of the current generation.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Current state at `at`, which must be in bounds.
    pub fn get(&self, at: Coord) -> CellState {
        self.grid.get(at)
    }

    /// Cells that changed in the last generation.
    pub fn changed_set(&self) -> &ChangedSet {
        &self.changed
    }

    /// Metrics for the most recent generation.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.metrics
    }

    /// Number of step workers.
    pub fn worker_count(&self) -> usize {
        self.pool.len()
    }

    /// Overwrite the listed cells directly.
    ///
    /// Every coordinate is checked before any cell is touched. If a
    /// changed-set is already known, the edited cells join it so the next
    /// step reconsiders their neighborhoods.
    pub fn apply_external_changes(&mut self, changes: &CellDiff) -> Result<(), GridError> {
        for &at in changes.keys() {
            self.grid.check(at)?;
        }
        let grid = Arc::make_mut(&mut self.grid);
        for (&at, &value) in changes {
            grid.set(at, value);
        }
        if let ChangedSet::Known(set) = &mut self.changed {
            set.extend(changes.keys().copied());
        }
        Ok(())
    }

    /// Cells that may change given that `changed` changed last generation.
    pub fn next_round(&self, changed: &CoordSet) -> CoordSet {
        match &self.bound {
            Some(b) => next_round(changed, &b.inverse, self.grid.dimension()),
            None => CoordSet::new(),
        }
    }

    /// Advance one generation and return the cells that changed.
    ///
    /// The returned diff replaces the changed-set even when empty. On
    /// error nothing is committed.
    pub fn step(&mut self) -> Result<CellDiff, StepError> {
        let started = Instant::now();
        let bound = self.bound.as_ref().ok_or(StepError::RuleNotBound)?;
        let dimension = self.grid.dimension();

        let candidates: Vec<Coord> = match &self.changed {
            ChangedSet::Unknown => self.grid.coords().collect(),
            ChangedSet::Known(set) => next_round(set, &bound.inverse, dimension)
                .into_iter()
                .collect(),
        };
        let candidate_count = candidates.len();
        let parallel = candidate_count >= self.serial_threshold;

        let changes = if parallel {
            self.pool
                .evaluate(&self.grid, &bound.rule, candidates.into())?
        } else {
            evaluate_guarded(&self.grid, bound.rule.as_ref(), &candidates)?
        };

        // Workers have dropped their handles, so this does not copy.
        let grid = Arc::make_mut(&mut self.grid);
        for (&at, &value) in &changes {
            grid.set(at, value);
        }
        self.changed = ChangedSet::Known(changes.keys().copied().collect());

        self.metrics = StepMetrics {
            candidates: candidate_count,
            changed: changes.len(),
            parallel,
            elapsed_us: started.elapsed().as_micros() as u64,
        };
        tracing::trace!(
            candidates = candidate_count,
            changed = changes.len(),
            parallel,
            "generation stepped"
        );
        Ok(changes)
    }
}

fn next_round(changed: &CoordSet, inverse: &[Offset], dimension: u32) -> CoordSet {
    let mut out = CoordSet::with_capacity(changed.len() * inverse.len());
    for &at in changed {
        for &off in inverse {
            out.insert(at.shifted(off, dimension));
        }
    }
    out
}
