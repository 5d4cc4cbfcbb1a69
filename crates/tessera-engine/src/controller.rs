//! User-facing [`Controller`]: the single-writer simulation state machine.
//!
//! # Architecture
//!
//! ```text
//! Caller thread(s)                 Runner thread              Step workers (N)
//!     |                                 |                           |
//!     |--start/stop/step/shutdown------>| cmd_rx.recv()/try_recv()  |
//!     |   [cmd_tx: bounded(64)]         | engine.step() ----------->| evaluate slice
//!     |   blocks on ack_rx              |<--------------------------| slice result
//!     |<--ack (after transition applied)| check states, merge diff  |
//!     |                                 |                           |
//!     |--pull_changes()-----> accumulator lock (never the queue)    |
//!     |--push_changes()-----> grid directly (only while Stopped)    |
//! ```
//!
//! Legality of every command is decided on the caller side under a
//! control lock, so at most one command is in flight. The grid has one
//! writer at a time: the runner while running or stepping, or a
//! `push_changes` caller while stopped, when the runner is provably
//! blocked on its queue.

use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use tessera_core::rule::validate_rule;
use tessera_core::{CellDiff, CellState, Coord, Grid, GridError, Rule};

use crate::accumulator::PeerCache;
use crate::board::GridEngine;
use crate::config::{ConfigError, ControllerConfig};
use crate::error::{ControlError, SimulationFault};
use crate::runner::{lock, Ack, Directive, Envelope, RunnerState, Shared};

// ── SimState ─────────────────────────────────────────────────────

/// Lifecycle state of a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SimState {
    /// No grid; only `init`/`reinit` are legal.
    Uninitialized,
    /// Grid allocated, not advancing.
    Stopped,
    /// The runner advances generations continuously.
    Running,
    /// A single synchronous `step()` is in flight.
    Stepping,
}

impl fmt::Display for SimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Stopped => "stopped",
            Self::Running => "running",
            Self::Stepping => "stepping",
        };
        f.write_str(s)
    }
}

/// A command issued to the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Bind a rule and allocate a grid.
    Init,
    /// Allocate a fresh grid with the bound rule.
    Reinit,
    /// Begin continuous stepping.
    Start,
    /// Halt continuous stepping.
    Stop,
    /// Advance exactly one generation.
    Step,
    /// Release the grid.
    Shutdown,
    /// Overwrite cells from outside.
    PushChanges,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Init => "init",
            Self::Reinit => "reinit",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Step => "step",
            Self::Shutdown => "shutdown",
            Self::PushChanges => "push_changes",
        };
        f.write_str(s)
    }
}

fn illegal(operation: Operation, state: SimState) -> ControlError {
    tracing::debug!(%operation, %state, "command rejected");
    ControlError::IllegalTransition { operation, state }
}

// ── Controller ───────────────────────────────────────────────────

/// Owns one simulation and arbitrates every command against its runner.
///
/// All methods take `&self`; share the controller across caller threads
/// with an `Arc`.
pub struct Controller {
    shared: Arc<Shared>,
    state: Mutex<SimState>,
    /// Held for the whole of each state-changing command.
    control: Mutex<Option<Arc<dyn Rule>>>,
    peer: Mutex<PeerCache>,
    cmd_tx: Option<Sender<Envelope>>,
    runner: Option<JoinHandle<()>>,
    config: ControllerConfig,
}

impl Controller {
    /// Validate `config` and spawn the runner thread.
    ///
    /// The controller starts [`SimState::Uninitialized`].
    pub fn new(config: ControllerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let shared = Arc::new(Shared::new());
        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(config.command_queue_capacity);

        let runner_shared = Arc::clone(&shared);
        let runner = thread::Builder::new()
            .name("tessera-runner".into())
            .spawn(move || RunnerState::new(runner_shared, cmd_rx).run())
            .map_err(|e| ConfigError::ThreadSpawnFailed {
                reason: format!("runner: {e}"),
            })?;

        Ok(Self {
            shared,
            state: Mutex::new(SimState::Uninitialized),
            control: Mutex::new(None),
            peer: Mutex::new(PeerCache::new()),
            cmd_tx: Some(cmd_tx),
            runner: Some(runner),
            config,
        })
    }

    /// The configuration this controller was built with.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Current lifecycle state.
    ///
    /// A fault raised by the runner is reflected here immediately.
    pub fn state(&self) -> SimState {
        if self.shared.is_faulted() {
            SimState::Uninitialized
        } else {
            *lock(&self.state)
        }
    }

    /// Most recent fault, if the simulation has ever faulted.
    pub fn last_fault(&self) -> Option<SimulationFault> {
        lock(&self.shared.last_fault).clone()
    }

    /// Generations advanced since the last `init`/`reinit`.
    pub fn generation(&self) -> u64 {
        self.shared.generations.load(Ordering::Relaxed)
    }

    /// Receive every future [`SimulationFault`].
    pub fn subscribe_faults(&self) -> Receiver<SimulationFault> {
        let (tx, rx) = crossbeam_channel::unbounded();
        lock(&self.shared.listeners).push(tx);
        rx
    }

    /// Bind `rule` and allocate a grid filled with `default_state`.
    ///
    /// Legal only from [`SimState::Uninitialized`]. On failure the
    /// controller stays uninitialized and the previous rule, if any,
    /// stays bound.
    pub fn init(&self, rule: Arc<dyn Rule>, default_state: CellState) -> Result<(), ControlError> {
        let mut bound = lock(&self.control);
        let mut state = self.reconciled_state();
        if *state != SimState::Uninitialized {
            return Err(illegal(Operation::Init, *state));
        }
        validate_rule(rule.as_ref())?;
        self.install(&rule, default_state)?;
        tracing::info!(rule = rule.name(), default_state, "simulation initialised");
        *bound = Some(rule);
        *state = SimState::Stopped;
        Ok(())
    }

    /// Allocate a fresh grid filled with `default_state`, reusing the
    /// bound rule. Clears pending changes and the peer-cache.
    ///
    /// Legal only from [`SimState::Uninitialized`] after a successful `init`.
    pub fn reinit(&self, default_state: CellState) -> Result<(), ControlError> {
        let bound = lock(&self.control);
        let mut state = self.reconciled_state();
        if *state != SimState::Uninitialized {
            return Err(illegal(Operation::Reinit, *state));
        }
        let rule = bound.as_ref().ok_or(ControlError::NoRuleBound)?;
        self.install(rule, default_state)?;
        tracing::info!(rule = rule.name(), default_state, "simulation reinitialised");
        *state = SimState::Stopped;
        Ok(())
    }

    /// Begin continuous stepping.
    ///
    /// From [`SimState::Stopped`] this blocks until the runner has taken
    /// over; from [`SimState::Running`] it is a no-op success.
    pub fn start(&self) -> Result<(), ControlError> {
        let _bound = lock(&self.control);
        let mut state = self.reconciled_state();
        match *state {
            SimState::Stopped => {
                *state = SimState::Running;
                drop(state);
                self.dispatch(Directive::Run)
            }
            SimState::Running => Ok(()),
            other => Err(illegal(Operation::Start, other)),
        }
    }

    /// Halt continuous stepping.
    ///
    /// From [`SimState::Running`] this blocks until the runner has
    /// finished its in-flight generation, so the grid has stopped
    /// changing when it returns; from [`SimState::Stopped`] it is a no-op.
    pub fn stop(&self) -> Result<(), ControlError> {
        let _bound = lock(&self.control);
        let mut state = self.reconciled_state();
        match *state {
            SimState::Running => {
                *state = SimState::Stopped;
                drop(state);
                self.dispatch(Directive::Stop)
            }
            SimState::Stopped => Ok(()),
            other => Err(illegal(Operation::Stop, other)),
        }
    }

    /// Advance exactly one generation and block until it is applied.
    ///
    /// Legal only from [`SimState::Stopped`].
    pub fn step(&self) -> Result<(), ControlError> {
        let _bound = lock(&self.control);
        let mut state = self.reconciled_state();
        if *state != SimState::Stopped {
            return Err(illegal(Operation::Step, *state));
        }
        *state = SimState::Stepping;
        drop(state);
        let result = self.dispatch(Directive::Step);
        let mut state = lock(&self.state);
        if *state == SimState::Stepping {
            *state = SimState::Stopped;
        }
        result
    }

    /// Release the grid and return to [`SimState::Uninitialized`].
    ///
    /// Legal only from [`SimState::Stopped`]. The bound rule is kept for
    /// a later `reinit`.
    pub fn shutdown(&self) -> Result<(), ControlError> {
        let _bound = lock(&self.control);
        let mut state = self.reconciled_state();
        if *state != SimState::Stopped {
            return Err(illegal(Operation::Shutdown, *state));
        }
        *state = SimState::Uninitialized;
        drop(state);
        self.dispatch(Directive::Shutdown)?;
        let engine = lock(&self.shared.board).take();
        drop(engine);
        tracing::info!("simulation shut down");
        Ok(())
    }

    /// Overwrite cells directly. Legal only from [`SimState::Stopped`].
    ///
    /// Every coordinate and state is validated before any cell changes.
    /// The written values are recorded as already known to the peer.
    pub fn push_changes(&self, changes: &CellDiff) -> Result<(), ControlError> {
        let bound = lock(&self.control);
        let state = self.reconciled_state();
        if *state != SimState::Stopped {
            return Err(illegal(Operation::PushChanges, *state));
        }
        if let Some(rule) = bound.as_ref() {
            let num_states = rule.num_states();
            if let Some((&coord, &value)) = changes.iter().find(|&(_, &v)| v >= num_states) {
                return Err(ControlError::Grid(GridError::StateOutOfRange {
                    coord,
                    value,
                    num_states,
                }));
            }
        }

        let mut board = lock(&self.shared.board);
        let engine = board.as_mut().ok_or(ControlError::RunnerGone)?;
        engine.apply_external_changes(changes)?;
        let mut peer = lock(&self.peer);
        for (&at, &value) in changes {
            peer.record(at, value);
        }
        tracing::debug!(cells = changes.len(), "external changes applied");
        Ok(())
    }

    /// Drain every change accumulated since the last pull.
    ///
    /// Always legal; contends only on the accumulator lock.
    pub fn pull_changes(&self) -> CellDiff {
        lock(&self.shared.accumulator).drain()
    }

    /// Drain accumulated changes and keep only those the peer has not
    /// already seen.
    pub fn pull_peer_diff(&self) -> CellDiff {
        let mut peer = lock(&self.peer);
        let drained = lock(&self.shared.accumulator).drain();
        peer.filter(drained)
    }

    /// Like [`pull_peer_diff`](Self::pull_peer_diff), but hands the diff
    /// to `deliver` before recording it in the peer-cache.
    ///
    /// If `deliver` fails nothing is recorded and the drained changes go
    /// back into the accumulator for the next pull.
    pub fn pull_peer_diff_with<T, E>(
        &self,
        deliver: impl FnOnce(&CellDiff) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut peer = lock(&self.peer);
        let drained = lock(&self.shared.accumulator).drain();
        let novel = peer.novel(&drained);
        match deliver(&novel) {
            Ok(out) => {
                peer.commit(&novel);
                Ok(out)
            }
            Err(e) => {
                lock(&self.shared.accumulator).restore(drained);
                Err(e)
            }
        }
    }

    /// Current state at `at`, or `None` without a grid or out of bounds.
    pub fn cell(&self, at: Coord) -> Option<CellState> {
        let board = lock(&self.shared.board);
        let engine = board.as_ref()?;
        engine.grid().check(at).ok()?;
        Some(engine.get(at))
    }

    /// Copy of the current grid, if one is allocated.
    pub fn snapshot(&self) -> Option<Grid> {
        lock(&self.shared.board).as_ref().map(|e| e.grid().clone())
    }

    /// Fold a runner fault into the caller-side state and return it locked.
    fn reconciled_state(&self) -> std::sync::MutexGuard<'_, SimState> {
        let mut state = lock(&self.state);
        if self.shared.is_faulted() && *state != SimState::Uninitialized {
            let previous = *state;
            tracing::debug!(from = %previous, "reconciling after fault");
            *state = SimState::Uninitialized;
        }
        state
    }

    /// Replace the grid. Caller holds the control lock and has checked
    /// the state is uninitialized, so the runner is idle.
    fn install(&self, rule: &Arc<dyn Rule>, default_state: CellState) -> Result<(), ControlError> {
        let num_states = rule.num_states();
        if default_state >= num_states {
            return Err(ControlError::Grid(GridError::StateOutOfRange {
                coord: Coord::new(0, 0),
                value: default_state,
                num_states,
            }));
        }

        let mut board = lock(&self.shared.board);
        // Tear the old grid (and its workers) down before building the new one.
        drop(board.take());
        let mut engine = GridEngine::new(&self.config.engine, default_state)?;
        engine.bind(Arc::clone(rule))?;
        let dimension = engine.dimension();
        tracing::debug!(dimension, workers = engine.worker_count(), "grid installed");
        *board = Some(engine);
        drop(board);

        lock(&self.shared.accumulator).clear();
        lock(&self.peer).reset(dimension, default_state);
        self.shared.generations.store(0, Ordering::Relaxed);
        self.shared.faulted.store(false, Ordering::Release);
        Ok(())
    }

    /// Enqueue a directive and block until the runner acknowledges it.
    fn dispatch(&self, directive: Directive) -> Result<(), ControlError> {
        let cmd_tx = self.cmd_tx.as_ref().ok_or(ControlError::RunnerGone)?;
        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        cmd_tx
            .send(Envelope {
                directive,
                ack: ack_tx,
            })
            .map_err(|_| ControlError::RunnerGone)?;
        let ack = ack_rx.recv().map_err(|_| ControlError::RunnerGone)?;

        let mut state = lock(&self.state);
        match ack {
            Ack::Faulted(fault) => {
                *state = SimState::Uninitialized;
                Err(ControlError::Faulted(fault))
            }
            Ack::Done if self.shared.is_faulted() => {
                // The runner faulted between our legality check and the ack.
                *state = SimState::Uninitialized;
                let fault = self.last_fault().map(ControlError::Faulted);
                Err(fault.unwrap_or(ControlError::RunnerGone))
            }
            Ack::Done => Ok(()),
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        if let Some(cmd_tx) = self.cmd_tx.take() {
            let (ack_tx, _ack_rx) = crossbeam_channel::bounded(1);
            let _ = cmd_tx.send(Envelope {
                directive: Directive::Exit,
                ack: ack_tx,
            });
        }
        if let Some(handle) = self.runner.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use std::time::{Duration, Instant};
    use tessera_rules::LifeLike;
    use tessera_test_utils::{ConstRule, PanickingRule};

    fn small_config() -> ControllerConfig {
        ControllerConfig {
            engine: EngineConfig {
                dimension: 16,
                serial_threshold: 50,
                worker_count: Some(2),
            },
            command_queue_capacity: 8,
        }
    }

    fn life() -> Arc<dyn Rule> {
        Arc::new(LifeLike::conway())
    }

    #[test]
    fn starts_uninitialized() {
        let c = Controller::new(small_config()).unwrap();
        assert_eq!(c.state(), SimState::Uninitialized);
        assert!(c.snapshot().is_none());
    }

    #[test]
    fn init_moves_to_stopped() {
        let c = Controller::new(small_config()).unwrap();
        c.init(life(), 0).unwrap();
        assert_eq!(c.state(), SimState::Stopped);
        assert_eq!(c.snapshot().unwrap().dimension(), 16);
    }

    #[test]
    fn reinit_without_rule_fails() {
        let c = Controller::new(small_config()).unwrap();
        assert_eq!(c.reinit(0), Err(ControlError::NoRuleBound));
        assert_eq!(c.state(), SimState::Uninitialized);
    }

    #[test]
    fn default_state_outside_alphabet_rejected() {
        let c = Controller::new(small_config()).unwrap();
        let err = c.init(life(), 2).unwrap_err();
        assert!(matches!(err, ControlError::Grid(GridError::StateOutOfRange { .. })));
        assert_eq!(c.state(), SimState::Uninitialized);
    }

    #[test]
    fn step_applies_before_returning() {
        let c = Controller::new(small_config()).unwrap();
        c.init(Arc::new(ConstRule::new(3, 2)), 0).unwrap();
        c.step().unwrap();
        assert_eq!(c.state(), SimState::Stopped);
        assert_eq!(c.cell(Coord::new(7, 7)), Some(2));
        assert_eq!(c.pull_changes().len(), 256);
        assert!(c.pull_changes().is_empty());
    }

    #[test]
    fn stop_freezes_grid() {
        let c = Controller::new(small_config()).unwrap();
        c.init(life(), 0).unwrap();
        let blinker: CellDiff = [(7, 6), (7, 7), (7, 8)]
            .into_iter()
            .map(|(r, col)| (Coord::new(r, col), 1))
            .collect();
        c.push_changes(&blinker).unwrap();
        c.start().unwrap();
        std::thread::sleep(Duration::from_millis(20));
        c.stop().unwrap();
        let frozen = c.snapshot().unwrap();
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(c.snapshot().unwrap(), frozen);
    }

    #[test]
    fn push_rejects_out_of_alphabet_state() {
        let c = Controller::new(small_config()).unwrap();
        c.init(life(), 0).unwrap();
        let mut bad = CellDiff::new();
        bad.insert(Coord::new(1, 1), 1);
        bad.insert(Coord::new(2, 2), 5);
        assert!(matches!(
            c.push_changes(&bad),
            Err(ControlError::Grid(GridError::StateOutOfRange { value: 5, .. }))
        ));
        assert_eq!(c.cell(Coord::new(1, 1)), Some(0));
    }

    #[test]
    fn panicking_rule_faults_simulation() {
        let c = Controller::new(small_config()).unwrap();
        let faults = c.subscribe_faults();
        c.init(Arc::new(PanickingRule::new("kaput")), 0).unwrap();
        let err = c.step().unwrap_err();
        assert!(matches!(
            err,
            ControlError::Faulted(SimulationFault::StepFailed(_))
        ));
        assert_eq!(c.state(), SimState::Uninitialized);
        assert!(faults.recv_timeout(Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn pull_is_safe_while_running() {
        let c = Arc::new(Controller::new(small_config()).unwrap());
        c.init(Arc::new(tessera_test_utils::ToggleRule), 0).unwrap();
        c.start().unwrap();
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut seen = 0;
        while seen == 0 {
            assert!(Instant::now() < deadline, "runner produced no changes");
            seen += c.pull_changes().len();
        }
        c.stop().unwrap();
        c.shutdown().unwrap();
        assert_eq!(c.state(), SimState::Uninitialized);
    }

    #[test]
    fn still_grid_backs_off_while_running() {
        let c = Controller::new(small_config()).unwrap();
        c.init(Arc::new(ConstRule::new(3, 0)), 0).unwrap();
        c.start().unwrap();
        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(c.cell(Coord::new(3, 3)), Some(0));
        c.stop().unwrap();
        // Back-off bounds the idle rate to roughly one generation per wait.
        assert!(c.generation() < 500, "spun {} generations", c.generation());
        assert!(c.pull_changes().is_empty());
    }

    #[test]
    fn generation_counts_and_resets() {
        let c = Controller::new(small_config()).unwrap();
        c.init(life(), 0).unwrap();
        c.step().unwrap();
        c.step().unwrap();
        assert_eq!(c.generation(), 2);
        c.reinit(0).unwrap();
        assert_eq!(c.generation(), 0);
    }

    #[test]
    fn failed_delivery_keeps_changes() {
        let c = Controller::new(small_config()).unwrap();
        c.init(Arc::new(ConstRule::new(3, 2)), 0).unwrap();
        c.step().unwrap();
        let failed: Result<(), &str> = c.pull_peer_diff_with(|_| Err("peer gone"));
        assert_eq!(failed, Err("peer gone"));
        let sent = c.pull_peer_diff_with(|d| Ok::<_, ()>(d.len())).unwrap();
        assert_eq!(sent, 256);
        assert!(c.pull_peer_diff().is_empty());
    }

    #[test]
    fn drop_while_running_joins_runner() {
        let c = Controller::new(small_config()).unwrap();
        c.init(Arc::new(tessera_test_utils::ToggleRule), 0).unwrap();
        c.start().unwrap();
        drop(c);
    }
}
