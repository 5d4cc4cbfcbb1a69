//! Toroidal coordinates and relative offsets.

use std::fmt;

/// A cell position on a square toroidal grid, `(row, col)`.
///
/// Coordinates are always stored already wrapped into `[0, dimension)`;
/// use [`Coord::shifted`] to apply an [`Offset`] with wraparound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    /// Row index.
    pub row: u32,
    /// Column index.
    pub col: u32,
}

impl Coord {
    /// Construct a coordinate from its row and column.
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Apply `offset` and wrap both axes onto a `dimension × dimension` torus.
    ///
    /// # Examples
    ///
    /// ```
    /// use tessera_core::{Coord, Offset};
    ///
    /// // Stepping up from the top row lands on the bottom row.
    /// let c = Coord::new(0, 5).shifted(Offset::new(-1, 0), 10);
    /// assert_eq!(c, Coord::new(9, 5));
    /// ```
    pub fn shifted(self, offset: Offset, dimension: u32) -> Self {
        Self {
            row: wrap_axis(self.row as i64 + offset.dr as i64, dimension),
            col: wrap_axis(self.col as i64 + offset.dc as i64, dimension),
        }
    }

    /// Whether this coordinate lies inside a `dimension × dimension` grid.
    pub fn in_bounds(self, dimension: u32) -> bool {
        self.row < dimension && self.col < dimension
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(u32, u32)> for Coord {
    fn from((row, col): (u32, u32)) -> Self {
        Self { row, col }
    }
}

/// A relative displacement `(dr, dc)` read by a rule's neighborhood.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Offset {
    /// Row displacement.
    pub dr: i32,
    /// Column displacement.
    pub dc: i32,
}

impl Offset {
    /// The zero offset: the cell itself.
    pub const ORIGIN: Offset = Offset { dr: 0, dc: 0 };

    /// Construct an offset.
    pub const fn new(dr: i32, dc: i32) -> Self {
        Self { dr, dc }
    }

    /// The offset pointing the opposite way.
    pub fn negated(self) -> Self {
        Self {
            dr: -self.dr,
            dc: -self.dc,
        }
    }
}

impl From<(i32, i32)> for Offset {
    fn from((dr, dc): (i32, i32)) -> Self {
        Self { dr, dc }
    }
}

/// Wrap a signed axis value into `[0, dimension)`.
///
/// Negative values wrap to `dimension + (value mod dimension)`; values at
/// or past `dimension` reduce modulo `dimension`. `dimension` must be
/// non-zero.
pub fn wrap_axis(value: i64, dimension: u32) -> u32 {
    value.rem_euclid(i64::from(dimension)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn wrap_below_zero() {
        assert_eq!(wrap_axis(-1, 10), 9);
        assert_eq!(wrap_axis(-10, 10), 0);
        assert_eq!(wrap_axis(-11, 10), 9);
    }

    #[test]
    fn wrap_past_end() {
        assert_eq!(wrap_axis(10, 10), 0);
        assert_eq!(wrap_axis(23, 10), 3);
    }

    #[test]
    fn shifted_up_from_top_row() {
        let c = Coord::new(0, 5).shifted(Offset::new(-1, 0), 10);
        assert_eq!(c, Coord::new(9, 5));
    }

    #[test]
    fn shifted_past_corner() {
        let c = Coord::new(9, 9).shifted(Offset::new(1, 1), 10);
        assert_eq!(c, Coord::new(0, 0));
    }

    #[test]
    fn negated_offset() {
        assert_eq!(Offset::new(2, -3).negated(), Offset::new(-2, 3));
        assert_eq!(Offset::ORIGIN.negated(), Offset::ORIGIN);
    }

    proptest! {
        #[test]
        fn shift_then_unshift_is_identity(
            dim in 1u32..64,
            row in 0u32..64,
            col in 0u32..64,
            dr in -200i32..200,
            dc in -200i32..200,
        ) {
            let c = Coord::new(row % dim, col % dim);
            let off = Offset::new(dr, dc);
            let there = c.shifted(off, dim);
            prop_assert!(there.in_bounds(dim));
            prop_assert_eq!(there.shifted(off.negated(), dim), c);
        }
    }
}
