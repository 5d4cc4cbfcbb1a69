//! Integration test: a Conway glider on a 40×40 torus, end to end
//! through the controller.

use std::collections::BTreeSet;
use std::sync::Arc;

use tessera_core::{Coord, Grid, Rule};
use tessera_engine::{Controller, ControllerConfig, EngineConfig, GridEngine};
use tessera_rules::LifeLike;
use tessera_test_utils::{glider, paint, reference_step};

const DIM: u32 = 40;

fn live_cells(grid: &Grid) -> BTreeSet<Coord> {
    grid.coords().filter(|&c| grid.get(c) == 1).collect()
}

fn controller() -> Controller {
    Controller::new(ControllerConfig {
        engine: EngineConfig {
            dimension: DIM,
            worker_count: Some(3),
            ..EngineConfig::default()
        },
        ..ControllerConfig::default()
    })
    .unwrap()
}

#[test]
fn first_step_matches_classic_conway() {
    let c = controller();
    c.init(Arc::new(LifeLike::conway()), 0).unwrap();
    let seed = paint(&glider(Coord::new(10, 10)), 1);
    c.push_changes(&seed).unwrap();

    let mut expected_grid = c.snapshot().unwrap();
    let expected = reference_step(&mut expected_grid, &LifeLike::conway());

    c.step().unwrap();
    let diff = c.pull_changes();
    assert_eq!(
        diff.iter().collect::<BTreeSet<_>>(),
        expected.iter().collect::<BTreeSet<_>>()
    );
    assert_eq!(c.snapshot().unwrap(), expected_grid);
}

#[test]
fn glider_translates_after_four_steps() {
    let c = controller();
    c.init(Arc::new(LifeLike::conway()), 0).unwrap();
    c.push_changes(&paint(&glider(Coord::new(10, 10)), 1)).unwrap();
    for _ in 0..4 {
        c.step().unwrap();
    }
    let expected: BTreeSet<Coord> = glider(Coord::new(11, 11)).into_iter().collect();
    assert_eq!(live_cells(&c.snapshot().unwrap()), expected);
}

#[test]
fn glider_wraps_around_the_torus() {
    let mut engine = GridEngine::new(
        &EngineConfig {
            dimension: DIM,
            serial_threshold: 50,
            worker_count: Some(2),
        },
        0,
    )
    .unwrap();
    let life: Arc<dyn Rule> = Arc::new(LifeLike::conway());
    engine.bind(Arc::clone(&life)).unwrap();
    engine
        .apply_external_changes(&paint(&glider(Coord::new(DIM - 3, DIM - 3)), 1))
        .unwrap();

    // A full lap brings it back to where it started.
    for _ in 0..(4 * DIM) {
        engine.step().unwrap();
    }
    let expected: BTreeSet<Coord> = glider(Coord::new(DIM - 3, DIM - 3)).into_iter().collect();
    assert_eq!(live_cells(engine.grid()), expected);
    assert!(engine.last_metrics().candidates < 100);
}

#[test]
fn running_glider_keeps_five_cells() {
    let c = controller();
    c.init(Arc::new(LifeLike::conway()), 0).unwrap();
    c.push_changes(&paint(&glider(Coord::new(5, 5)), 1)).unwrap();
    c.start().unwrap();
    std::thread::sleep(std::time::Duration::from_millis(30));
    c.stop().unwrap();
    assert_eq!(live_cells(&c.snapshot().unwrap()).len(), 5);
}
