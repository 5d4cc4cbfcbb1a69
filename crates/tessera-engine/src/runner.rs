//! The runner thread: exclusive stepper of the grid between commands.
//!
//! Commands arrive on a bounded crossbeam channel, each with its own
//! bounded(1) acknowledgement channel. The runner acknowledges a
//! command only after the transition it requested has been applied,
//! including the generation a `Step` asks for. While running it polls
//! the queue without blocking between generations, or waits up to
//! [`IDLE_BACKOFF`] once a generation changes nothing; otherwise it
//! blocks until the next command arrives.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};

use crate::accumulator::Accumulator;
use crate::board::GridEngine;
use crate::controller::SimState;
use crate::error::SimulationFault;

/// How long a running runner waits for a command after a generation
/// in which no cell changed.
pub(crate) const IDLE_BACKOFF: Duration = Duration::from_millis(2);

/// State reachable from both the controller and the runner.
pub(crate) struct Shared {
    pub board: Mutex<Option<GridEngine>>,
    pub accumulator: Mutex<Accumulator>,
    /// Set by the runner on a fault, cleared by the next `init`/`reinit`.
    pub faulted: AtomicBool,
    /// Generations advanced since the grid was last built.
    pub generations: AtomicU64,
    pub last_fault: Mutex<Option<SimulationFault>>,
    pub listeners: Mutex<Vec<Sender<SimulationFault>>>,
}

impl Shared {
    pub fn new() -> Self {
        Self {
            board: Mutex::new(None),
            accumulator: Mutex::new(Accumulator::new()),
            faulted: AtomicBool::new(false),
            generations: AtomicU64::new(0),
            last_fault: Mutex::new(None),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn is_faulted(&self) -> bool {
        self.faulted.load(Ordering::Acquire)
    }
}

/// Acquire a mutex, recovering the data if a panicking holder poisoned it.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What the runner is asked to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Directive {
    Run,
    Stop,
    Step,
    Shutdown,
    /// Leave the loop. Sent only when the controller is dropped.
    Exit,
}

/// How a command ended, as seen by the runner.
#[derive(Debug)]
pub(crate) enum Ack {
    Done,
    Faulted(SimulationFault),
}

pub(crate) struct Envelope {
    pub directive: Directive,
    pub ack: Sender<Ack>,
}

pub(crate) struct RunnerState {
    shared: std::sync::Arc<Shared>,
    cmd_rx: Receiver<Envelope>,
    view: SimState,
}

impl RunnerState {
    pub fn new(shared: std::sync::Arc<Shared>, cmd_rx: Receiver<Envelope>) -> Self {
        Self {
            shared,
            cmd_rx,
            view: SimState::Uninitialized,
        }
    }

    /// Main loop. Runs until an `Exit` directive arrives or the
    /// controller side of the channel is dropped.
    pub fn run(mut self) {
        let mut in_flight: Option<Sender<Ack>> = None;
        let mut outcome = Ack::Done;
        let mut idle = false;
        loop {
            // 1. Acknowledge the command handled last iteration, exactly once.
            if let Some(ack) = in_flight.take() {
                // Best-effort: the caller may have gone away.
                let _ = ack.send(std::mem::replace(&mut outcome, Ack::Done));
            }

            // 2. Block for a command unless running.
            let next = if self.view == SimState::Running && idle {
                match self.cmd_rx.recv_timeout(IDLE_BACKOFF) {
                    Ok(envelope) => Some(envelope),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            } else if self.view == SimState::Running {
                match self.cmd_rx.try_recv() {
                    Ok(envelope) => Some(envelope),
                    Err(TryRecvError::Empty) => None,
                    Err(TryRecvError::Disconnected) => break,
                }
            } else {
                match self.cmd_rx.recv() {
                    Ok(envelope) => Some(envelope),
                    Err(_) => break,
                }
            };

            if let Some(envelope) = next {
                self.view = match envelope.directive {
                    Directive::Run => SimState::Running,
                    Directive::Stop => SimState::Stopped,
                    Directive::Step => SimState::Stepping,
                    Directive::Shutdown => SimState::Uninitialized,
                    Directive::Exit => {
                        let _ = envelope.ack.send(Ack::Done);
                        break;
                    }
                };
                tracing::debug!(view = %self.view, "runner observed transition");
                in_flight = Some(envelope.ack);
                idle = false;
            }

            // 3. Advance one generation if running or stepping.
            if matches!(self.view, SimState::Running | SimState::Stepping) {
                match self.advance() {
                    Ok(Some(changed)) => idle = changed == 0,
                    Ok(None) => self.view = SimState::Uninitialized,
                    Err(fault) => {
                        self.raise(fault.clone());
                        // Only the command that triggered this generation hears about it.
                        if in_flight.is_some() {
                            outcome = Ack::Faulted(fault);
                        }
                        self.view = SimState::Uninitialized;
                    }
                }
                if self.view == SimState::Stepping {
                    self.view = SimState::Stopped;
                }
            }
        }
        tracing::debug!("runner exited");
    }

    /// Step the grid once and merge the diff into the accumulator.
    ///
    /// Returns the number of cells that changed, or `Ok(None)` when
    /// there is no grid to step.
    fn advance(&mut self) -> Result<Option<usize>, SimulationFault> {
        let mut board = lock(&self.shared.board);
        let Some(engine) = board.as_mut() else {
            return Ok(None);
        };
        let diff = engine.step().map_err(SimulationFault::StepFailed)?;

        if let Some(rule) = engine.rule() {
            let num_states = rule.num_states();
            if let Some((&coord, &value)) = diff.iter().find(|&(_, &v)| v >= num_states) {
                return Err(SimulationFault::OutOfRange {
                    coord,
                    value,
                    num_states,
                });
            }
        }

        lock(&self.shared.accumulator).merge(&diff);
        self.shared.generations.fetch_add(1, Ordering::Relaxed);
        Ok(Some(diff.len()))
    }

    /// Record a fault, notify listeners, and tear the grid down.
    fn raise(&self, fault: SimulationFault) {
        tracing::error!(%fault, "simulation faulted; forcing shutdown");
        // The grid goes before the flag is raised: once callers observe
        // the fault they may `init` a replacement.
        let engine = lock(&self.shared.board).take();
        drop(engine);
        *lock(&self.shared.last_fault) = Some(fault.clone());
        self.shared.faulted.store(true, Ordering::Release);
        lock(&self.shared.listeners).retain(|tx| tx.send(fault.clone()).is_ok());
    }
}
