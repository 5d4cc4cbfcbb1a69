//! Two-state outer-totalistic ("Life-like") rules.

use std::fmt;

use tessera_core::{CellState, Offset, Rule, RuleError};

use crate::MOORE_WITH_SELF;

/// A Life-like rule: a dead cell is born when its live-neighbour count
/// is in the birth set, and a live cell survives when the count is in
/// the survival set. Everything else dies or stays dead.
///
/// Neighborhood order is [`MOORE_WITH_SELF`]: the cell first, then its
/// eight neighbours.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LifeLike {
    name: String,
    birth: [bool; 9],
    survival: [bool; 9],
}

impl LifeLike {
    /// Conway's Game of Life, `B3/S23`.
    pub fn conway() -> Self {
        let mut rule = Self::from_counts(&[3], &[2, 3]);
        rule.name = "life".into();
        rule
    }

    /// Build from explicit birth and survival neighbour counts (0..=8).
    /// Counts above 8 are ignored.
    pub fn from_counts(birth: &[u8], survival: &[u8]) -> Self {
        let mut rule = Self {
            name: String::new(),
            birth: [false; 9],
            survival: [false; 9],
        };
        for &n in birth.iter().filter(|&&n| n <= 8) {
            rule.birth[n as usize] = true;
        }
        for &n in survival.iter().filter(|&&n| n <= 8) {
            rule.survival[n as usize] = true;
        }
        rule.name = rule.rulestring();
        rule
    }

    /// Parse a `B…/S…` rulestring such as `B36/S23`.
    ///
    /// The two halves may appear in either order and the letters are
    /// case-insensitive. Either digit list may be empty.
    pub fn from_rulestring(source: &str) -> Result<Self, RuleError> {
        let invalid = |reason: String| RuleError::Invalid { reason };
        let (first, second) = source
            .trim()
            .split_once('/')
            .ok_or_else(|| invalid(format!("rulestring '{source}' has no '/'")))?;

        let mut birth: Option<Vec<u8>> = None;
        let mut survival: Option<Vec<u8>> = None;
        for part in [first, second] {
            let mut chars = part.chars();
            let slot = match chars.next().map(|c| c.to_ascii_uppercase()) {
                Some('B') => &mut birth,
                Some('S') => &mut survival,
                _ => {
                    return Err(invalid(format!(
                        "rulestring '{source}': each half must start with B or S"
                    )))
                }
            };
            if slot.is_some() {
                return Err(invalid(format!("rulestring '{source}' repeats a half")));
            }
            let counts = chars
                .map(|c| match c.to_digit(10) {
                    Some(d) if d <= 8 => Ok(d as u8),
                    _ => Err(invalid(format!(
                        "rulestring '{source}': '{c}' is not a neighbour count"
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            *slot = Some(counts);
        }

        match (birth, survival) {
            (Some(b), Some(s)) => Ok(Self::from_counts(&b, &s)),
            _ => Err(invalid(format!("rulestring '{source}' needs both B and S"))),
        }
    }

    /// Canonical `B…/S…` form with counts in ascending order.
    pub fn rulestring(&self) -> String {
        let digits = |set: &[bool; 9]| -> String {
            (0..9u8)
                .filter(|&n| set[n as usize])
                .map(|n| char::from(b'0' + n))
                .collect()
        };
        format!("B{}/S{}", digits(&self.birth), digits(&self.survival))
    }
}

impl fmt::Display for LifeLike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rulestring())
    }
}

impl Rule for LifeLike {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_states(&self) -> CellState {
        2
    }

    fn neighborhood(&self) -> &[Offset] {
        &MOORE_WITH_SELF
    }

    fn next(&self, values: &[CellState]) -> CellState {
        let Some((&me, neighbours)) = values.split_first() else {
            return 0;
        };
        let live = neighbours.iter().filter(|&&v| v == 1).count();
        let table = if me == 1 { &self.survival } else { &self.birth };
        CellState::from(table.get(live).copied().unwrap_or(false))
    }
}
