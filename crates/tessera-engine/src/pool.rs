//! Persistent step-worker pool.
//!
//! One long-lived thread per worker, created with the [`GridEngine`]
//! and kept for its whole life so no thread is spawned per generation.
//! Each worker owns a private assignment channel and a private
//! bounded(1) result channel. Receiving a result consumes it, so a
//! stale completion can never satisfy the next generation's wait.
//!
//! Workers read the grid through a shared `Arc<Grid>` and drop their
//! handle before reporting, which lets the engine reclaim unique
//! ownership for the commit without copying.
//!
//! [`GridEngine`]: crate::GridEngine

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use tessera_core::{CellDiff, Coord, Grid, Rule, StepError};

use crate::config::ConfigError;

type SliceOutcome = Result<CellDiff, StepError>;

/// Everything a worker needs to evaluate one generation.
#[derive(Clone)]
struct SliceJob {
    grid: Arc<Grid>,
    rule: Arc<dyn Rule>,
    points: Arc<[Coord]>,
}

enum Assignment {
    /// Evaluate `points[start..end]`.
    Slice {
        job: SliceJob,
        start: usize,
        end: usize,
    },
    /// Finish and exit. Sent only when the pool is torn down.
    Terminate,
}

struct Worker {
    assign: Sender<Assignment>,
    done: Receiver<SliceOutcome>,
    handle: Option<JoinHandle<()>>,
}

/// A fixed set of step workers, one per available processor.
pub struct WorkerPool {
    workers: Vec<Worker>,
}

impl WorkerPool {
    /// Spawn `count` workers (at least one).
    pub fn new(count: usize) -> Result<Self, ConfigError> {
        let count = count.max(1);
        let mut workers = Vec::with_capacity(count);
        for i in 0..count {
            let (assign_tx, assign_rx) = crossbeam_channel::unbounded();
            let (done_tx, done_rx) = crossbeam_channel::bounded(1);
            let handle = thread::Builder::new()
                .name(format!("tessera-step-{i}"))
                .spawn(move || worker_loop(assign_rx, done_tx))
                .map_err(|e| ConfigError::ThreadSpawnFailed {
                    reason: format!("step worker {i}: {e}"),
                })?;
            workers.push(Worker {
                assign: assign_tx,
                done: done_rx,
                handle: Some(handle),
            });
        }
        tracing::debug!(workers = count, "step worker pool started");
        Ok(Self { workers })
    }

    /// Number of workers in the pool.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Always `false`: a pool has at least one worker.
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Evaluate `rule` at every point, split into contiguous slices.
    ///
    /// Blocks until every dispatched slice has reported. The merged map
    /// preserves the order of `points`.
    pub fn evaluate(
        &self,
        grid: &Arc<Grid>,
        rule: &Arc<dyn Rule>,
        points: Arc<[Coord]>,
    ) -> Result<CellDiff, StepError> {
        let job = SliceJob {
            grid: Arc::clone(grid),
            rule: Arc::clone(rule),
            points,
        };
        let total = job.points.len();
        let n = self.workers.len();
        let per_worker = total / n;

        let mut dispatched = Vec::with_capacity(n);
        let mut failure = None;
        let mut start = 0;
        for (i, worker) in self.workers.iter().enumerate() {
            // The last worker takes the remainder.
            let end = if i + 1 < n { start + per_worker } else { total };
            if end > start {
                let slice = Assignment::Slice {
                    job: job.clone(),
                    start,
                    end,
                };
                if worker.assign.send(slice).is_ok() {
                    dispatched.push(i);
                } else if failure.is_none() {
                    failure = Some(StepError::WorkerLost { worker: i });
                }
            }
            start = end;
        }
        drop(job);

        // Always drain every dispatched worker, even after a failure, so
        // no result is left behind for the next generation.
        let mut changes = CellDiff::new();
        for i in dispatched {
            match self.workers[i].done.recv() {
                Ok(Ok(part)) => changes.extend(part),
                Ok(Err(e)) => {
                    failure.get_or_insert(e);
                }
                Err(_) => {
                    failure.get_or_insert(StepError::WorkerLost { worker: i });
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(changes),
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        for worker in &self.workers {
            let _ = worker.assign.send(Assignment::Terminate);
        }
        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take() {
                let _ = handle.join();
            }
        }
        tracing::debug!(workers = self.workers.len(), "step worker pool stopped");
    }
}

fn worker_loop(assign_rx: Receiver<Assignment>, done_tx: Sender<SliceOutcome>) {
    while let Ok(assignment) = assign_rx.recv() {
        let (job, start, end) = match assignment {
            Assignment::Slice { job, start, end } => (job, start, end),
            Assignment::Terminate => break,
        };
        let outcome = evaluate_guarded(&job.grid, job.rule.as_ref(), &job.points[start..end]);
        // Release the grid before reporting so the engine can take it back.
        drop(job);
        if done_tx.send(outcome).is_err() {
            break;
        }
    }
}

/// Evaluate `rule` at each point, recording only cells whose state changes.
pub(crate) fn evaluate_points(grid: &Grid, rule: &dyn Rule, points: &[Coord]) -> CellDiff {
    let neighborhood = rule.neighborhood();
    let mut changes = CellDiff::new();
    for &at in points {
        let values = grid.gather(at, neighborhood);
        let next = rule.next(&values);
        if next != grid.get(at) {
            changes.insert(at, next);
        }
    }
    changes
}

/// [`evaluate_points`] with a rule panic turned into [`StepError::RuleFailed`].
pub(crate) fn evaluate_guarded(grid: &Grid, rule: &dyn Rule, points: &[Coord]) -> SliceOutcome {
    panic::catch_unwind(AssertUnwindSafe(|| evaluate_points(grid, rule, points))).map_err(
        |payload| StepError::RuleFailed {
            reason: panic_reason(payload.as_ref()),
        },
    )
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
