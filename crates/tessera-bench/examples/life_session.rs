//! End-to-end controller session example.
//!
//! Demonstrates: init → push a soup → run for a while → stop → pull the
//! accumulated diff → step by hand → shut down.

use std::sync::Arc;
use std::time::Duration;

use tessera_bench::soup;
use tessera_engine::{Controller, ControllerConfig};
use tessera_rules::LifeLike;

fn main() {
    println!("=== Tessera Life Session ===\n");

    let controller = Controller::new(ControllerConfig::default()).unwrap();
    let dimension = controller.config().engine.dimension;
    controller.init(Arc::new(LifeLike::conway()), 0).unwrap();
    let seed = soup(dimension, 42);
    println!("{dimension}x{dimension} grid, {} live cells seeded", seed.len());
    controller.push_changes(&seed).unwrap();

    controller.start().unwrap();
    std::thread::sleep(Duration::from_millis(500));
    controller.stop().unwrap();
    let pulled = controller.pull_peer_diff();
    println!("after 500 ms running: {} cells differ from the seed", pulled.len());

    for generation in 1..=5 {
        controller.step().unwrap();
        println!("manual step {generation}: {} cells changed", controller.pull_changes().len());
    }

    let live = controller
        .snapshot()
        .map(|grid| grid.as_slice().iter().filter(|&&v| v == 1).count())
        .unwrap_or(0);
    println!("\nlive cells at shutdown: {live}");
    controller.shutdown().unwrap();
}
