//! Integration test: every (state, command) pair against the legality table.

use std::sync::Arc;

use tessera_core::{CellDiff, Coord};
use tessera_engine::{ControlError, Controller, ControllerConfig, EngineConfig, Operation, SimState};
use tessera_rules::LifeLike;

fn controller() -> Controller {
    Controller::new(ControllerConfig {
        engine: EngineConfig {
            dimension: 12,
            worker_count: Some(2),
            ..EngineConfig::default()
        },
        command_queue_capacity: 4,
    })
    .unwrap()
}

/// Drive a fresh controller into `state`. `bound` leaves a rule bound
/// when the target is `Uninitialized`.
fn reach(state: SimState, bound: bool) -> Controller {
    let c = controller();
    match state {
        SimState::Uninitialized => {
            if bound {
                c.init(Arc::new(LifeLike::conway()), 0).unwrap();
                c.shutdown().unwrap();
            }
        }
        SimState::Stopped => c.init(Arc::new(LifeLike::conway()), 0).unwrap(),
        SimState::Running => {
            c.init(Arc::new(LifeLike::conway()), 0).unwrap();
            c.start().unwrap();
        }
        SimState::Stepping => unreachable!("transient"),
    }
    assert_eq!(c.state(), state);
    c
}

fn issue(c: &Controller, op: Operation) -> Result<(), ControlError> {
    match op {
        Operation::Init => c.init(Arc::new(LifeLike::conway()), 0),
        Operation::Reinit => c.reinit(0),
        Operation::Start => c.start(),
        Operation::Stop => c.stop(),
        Operation::Step => c.step(),
        Operation::Shutdown => c.shutdown(),
        Operation::PushChanges => {
            let mut diff = CellDiff::new();
            diff.insert(Coord::new(3, 3), 1);
            c.push_changes(&diff)
        }
    }
}

const ALL_OPS: [Operation; 7] = [
    Operation::Init,
    Operation::Reinit,
    Operation::Start,
    Operation::Stop,
    Operation::Step,
    Operation::Shutdown,
    Operation::PushChanges,
];

/// `Some(next)` if legal from `state`, `None` if rejected.
fn expected(state: SimState, op: Operation, bound: bool) -> Option<SimState> {
    use Operation::*;
    use SimState::*;
    match (state, op) {
        (Uninitialized, Init) => Some(Stopped),
        (Uninitialized, Reinit) if bound => Some(Stopped),
        (Stopped, Start) => Some(Running),
        (Stopped, Stop) => Some(Stopped),
        (Stopped, Step) => Some(Stopped),
        (Stopped, Shutdown) => Some(Uninitialized),
        (Stopped, PushChanges) => Some(Stopped),
        (Running, Start) => Some(Running),
        (Running, Stop) => Some(Stopped),
        _ => None,
    }
}

#[test]
fn legality_table() {
    let cases = [
        (SimState::Uninitialized, false),
        (SimState::Uninitialized, true),
        (SimState::Stopped, true),
        (SimState::Running, true),
    ];
    for (state, bound) in cases {
        for op in ALL_OPS {
            let c = reach(state, bound);
            let result = issue(&c, op);
            match expected(state, op, bound) {
                Some(next) => {
                    assert!(result.is_ok(), "{op} from {state}: {result:?}");
                    assert_eq!(c.state(), next, "{op} from {state}");
                }
                None => {
                    assert!(result.is_err(), "{op} from {state} was accepted");
                    assert_eq!(c.state(), state, "{op} from {state} changed state");
                }
            }
            if c.state() == SimState::Running {
                c.stop().unwrap();
            }
        }
    }
}

#[test]
fn illegal_transition_names_command_and_state() {
    let c = reach(SimState::Running, true);
    assert_eq!(
        c.step(),
        Err(ControlError::IllegalTransition {
            operation: Operation::Step,
            state: SimState::Running,
        })
    );
    c.stop().unwrap();
}

#[test]
fn reinit_without_binding_is_distinct_error() {
    let c = reach(SimState::Uninitialized, false);
    assert_eq!(c.reinit(0), Err(ControlError::NoRuleBound));
}

#[test]
fn commands_from_many_threads_serialize() {
    let c = Arc::new(reach(SimState::Stopped, true));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let c = Arc::clone(&c);
            std::thread::spawn(move || {
                for _ in 0..20 {
                    if i % 2 == 0 {
                        let _ = c.start();
                        let _ = c.stop();
                    } else {
                        let _ = c.step();
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    let _ = c.stop();
    assert_eq!(c.state(), SimState::Stopped);
}
