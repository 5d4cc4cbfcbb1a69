//! Test utilities for Tessera development.
//!
//! Provides fixture rules with known behaviour, a couple of classic
//! patterns, seeded random soups, and a naive full-grid
//! [`reference_step`] that the incremental engine is checked against.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{ConstRule, CounterRule, PanickingRule, ShiftRule, TableRule, ToggleRule};

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tessera_core::{CellDiff, CellState, Coord, Grid, Rule};

/// The five live cells of a south-east travelling glider with its
/// bounding box's top-left corner at `origin`.
///
/// ```text
/// . # .
/// . . #
/// # # #
/// ```
pub fn glider(origin: Coord) -> Vec<Coord> {
    [(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)]
        .into_iter()
        .map(|(dr, dc)| Coord::new(origin.row + dr, origin.col + dc))
        .collect()
}

/// A horizontal period-2 blinker centred on `centre`.
pub fn blinker(centre: Coord) -> Vec<Coord> {
    (0..3)
        .map(|i| Coord::new(centre.row, centre.col + i - 1))
        .collect()
}

/// Set every cell in `cells` to `state` and return the edit as a diff.
pub fn paint(cells: &[Coord], state: CellState) -> CellDiff {
    cells.iter().map(|&c| (c, state)).collect()
}

/// A deterministic random diff covering roughly `density` percent of a
/// `dimension`-square grid with states in `1..num_states`.
pub fn random_soup(seed: u64, dimension: u32, num_states: CellState, density: u32) -> CellDiff {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut soup = CellDiff::new();
    if num_states < 2 {
        return soup;
    }
    for row in 0..dimension {
        for col in 0..dimension {
            if rng.next_u32() % 100 < density {
                let state = 1 + rng.next_u32() % (num_states - 1);
                soup.insert(Coord::new(row, col), state);
            }
        }
    }
    soup
}

/// Advance `grid` one generation by evaluating every cell, and return
/// the cells whose state changed.
///
/// This is the definition the incremental engine must agree with.
pub fn reference_step(grid: &mut Grid, rule: &dyn Rule) -> CellDiff {
    let neighborhood = rule.neighborhood();
    let diff: CellDiff = grid
        .coords()
        .filter_map(|at| {
            let next = rule.next(&grid.gather(at, neighborhood));
            (next != grid.get(at)).then_some((at, next))
        })
        .collect();
    for (&at, &value) in &diff {
        grid.set(at, value);
    }
    diff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glider_has_five_cells() {
        let g = glider(Coord::new(3, 3));
        assert_eq!(g.len(), 5);
        assert!(g.contains(&Coord::new(5, 5)));
    }

    #[test]
    fn soup_is_seeded() {
        assert_eq!(random_soup(7, 20, 4, 30), random_soup(7, 20, 4, 30));
        assert!(random_soup(7, 20, 4, 30).values().all(|&v| (1..4).contains(&v)));
    }

    #[test]
    fn reference_step_applies_const_rule() {
        let mut grid = Grid::new(4, 0).unwrap();
        let diff = reference_step(&mut grid, &ConstRule::new(2, 1));
        assert_eq!(diff.len(), 16);
        assert!(grid.as_slice().iter().all(|&v| v == 1));
        assert!(reference_step(&mut grid, &ConstRule::new(2, 1)).is_empty());
    }
}
