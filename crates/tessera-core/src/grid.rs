//! Dense square toroidal state array.

use smallvec::SmallVec;

use crate::coord::{Coord, Offset};
use crate::error::GridError;
use crate::CellState;

/// Neighborhood values gathered for one cell, in neighborhood order.
///
/// Nine inline slots cover the Moore neighborhood plus the cell itself.
pub type NeighborValues = SmallVec<[CellState; 9]>;

/// A `dimension × dimension` array of cell states with toroidal edges.
///
/// Storage is row-major. Every coordinate handed to [`get`](Grid::get) or
/// [`set`](Grid::set) must already be in bounds; coordinates built with
/// [`Coord::shifted`] always are.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    dimension: u32,
    cells: Vec<CellState>,
}

impl Grid {
    /// Allocate a grid with every cell set to `fill`.
    ///
    /// Returns `Err(GridError::EmptyGrid)` for a zero dimension.
    pub fn new(dimension: u32, fill: CellState) -> Result<Self, GridError> {
        if dimension == 0 {
            return Err(GridError::EmptyGrid);
        }
        let n = dimension as usize * dimension as usize;
        Ok(Self {
            dimension,
            cells: vec![fill; n],
        })
    }

    /// Side length of the grid.
    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn index(&self, at: Coord) -> usize {
        at.row as usize * self.dimension as usize + at.col as usize
    }

    /// Current state at `at`.
    pub fn get(&self, at: Coord) -> CellState {
        self.cells[self.index(at)]
    }

    /// Overwrite the state at `at`.
    pub fn set(&mut self, at: Coord, value: CellState) {
        let i = self.index(at);
        self.cells[i] = value;
    }

    /// Reject coordinates outside the grid.
    pub fn check(&self, at: Coord) -> Result<(), GridError> {
        if at.in_bounds(self.dimension) {
            Ok(())
        } else {
            Err(GridError::CoordOutOfBounds {
                coord: at,
                dimension: self.dimension,
            })
        }
    }

    /// Every coordinate in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        let d = self.dimension;
        (0..d).flat_map(move |row| (0..d).map(move |col| Coord::new(row, col)))
    }

    /// Raw row-major cell slice.
    pub fn as_slice(&self) -> &[CellState] {
        &self.cells
    }

    /// Read the states under `neighborhood` centred on `at`, wrapping at
    /// the edges, in the same order as the offsets.
    pub fn gather(&self, at: Coord, neighborhood: &[Offset]) -> NeighborValues {
        neighborhood
            .iter()
            .map(|&off| self.get(at.shifted(off, self.dimension)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimension_rejected() {
        assert_eq!(Grid::new(0, 0), Err(GridError::EmptyGrid));
    }

    #[test]
    fn filled_with_default() {
        let g = Grid::new(4, 3).unwrap();
        assert_eq!(g.cell_count(), 16);
        assert!(g.as_slice().iter().all(|&v| v == 3));
    }

    #[test]
    fn coords_row_major() {
        let g = Grid::new(2, 0).unwrap();
        let all: Vec<Coord> = g.coords().collect();
        assert_eq!(
            all,
            vec![
                Coord::new(0, 0),
                Coord::new(0, 1),
                Coord::new(1, 0),
                Coord::new(1, 1)
            ]
        );
    }

    #[test]
    fn gather_wraps_on_torus() {
        let mut g = Grid::new(10, 0).unwrap();
        g.set(Coord::new(9, 5), 7);
        g.set(Coord::new(0, 9), 4);
        let offsets = [Offset::ORIGIN, Offset::new(-1, 0), Offset::new(0, -6)];
        let vals = g.gather(Coord::new(0, 5), &offsets);
        assert_eq!(vals.as_slice(), &[0, 7, 4]);
    }

    #[test]
    fn check_rejects_out_of_bounds() {
        let g = Grid::new(5, 0).unwrap();
        assert!(g.check(Coord::new(4, 4)).is_ok());
        assert_eq!(
            g.check(Coord::new(5, 0)),
            Err(GridError::CoordOutOfBounds {
                coord: Coord::new(5, 0),
                dimension: 5
            })
        );
    }
}
