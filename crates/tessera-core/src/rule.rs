//! The [`Rule`] contract a transition function must satisfy.

use std::sync::Arc;

use crate::coord::Offset;
use crate::error::RuleError;
use crate::CellState;

/// A pure transition function over a fixed neighborhood.
///
/// # Contract
///
/// - `next()` MUST be a pure function of `values`: no hidden counters,
///   randomness, or other external state. The engine only re-evaluates
///   cells whose neighborhood changed in the previous generation, so a
///   rule that reads anything else will silently desynchronise.
/// - `values` has the same length and order as [`neighborhood()`](Rule::neighborhood).
/// - The result MUST lie in `[0, num_states())`. The engine does not
///   check this; the controller does, and shuts the simulation down on
///   a violation.
/// - The neighborhood must include [`Offset::ORIGIN`] for a cell's own
///   prior state to matter.
/// - `neighborhood()` and `num_states()` are read once when the rule is
///   bound and must not change afterwards.
///
/// # Examples
///
/// ```
/// use tessera_core::{CellState, Offset, Rule};
///
/// /// Every cell copies its western neighbour.
/// struct ShiftEast;
///
/// impl Rule for ShiftEast {
///     fn name(&self) -> &str { "shift-east" }
///     fn num_states(&self) -> CellState { 2 }
///     fn neighborhood(&self) -> &[Offset] {
///         const WEST: &[Offset] = &[Offset::new(0, -1)];
///         WEST
///     }
///     fn next(&self, values: &[CellState]) -> CellState { values[0] }
/// }
///
/// assert_eq!(ShiftEast.next(&[1]), 1);
/// ```
pub trait Rule: Send + Sync + 'static {
    /// Human-readable name for logs and error reports.
    fn name(&self) -> &str;

    /// Size of the state alphabet; valid states are `[0, num_states)`.
    fn num_states(&self) -> CellState;

    /// Relative offsets read for each cell, in the order `next` receives them.
    fn neighborhood(&self) -> &[Offset];

    /// Next state of a cell given its neighborhood values.
    fn next(&self, values: &[CellState]) -> CellState;
}

/// Turns a rule source (a registered name, a rulestring) into a rule.
///
/// The command surface resolves every `init` source through one of
/// these, so embedding applications can plug in their own catalogue.
pub trait RuleProvider: Send + Sync {
    /// Resolve `source`, or explain why it cannot be.
    fn resolve(&self, source: &str) -> Result<Arc<dyn Rule>, RuleError>;
}

/// Check the static shape of a rule before it is bound.
pub fn validate_rule(rule: &dyn Rule) -> Result<(), RuleError> {
    if rule.num_states() == 0 {
        return Err(RuleError::NoStates);
    }
    if rule.neighborhood().is_empty() {
        return Err(RuleError::EmptyNeighborhood);
    }
    Ok(())
}

/// Negate every offset of `neighborhood`.
///
/// The image of a changed cell under the inverse neighborhood is exactly
/// the set of cells whose neighborhood contains it.
pub fn inverse_neighborhood(neighborhood: &[Offset]) -> Vec<Offset> {
    neighborhood.iter().map(|o| o.negated()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Empty;

    impl Rule for Empty {
        fn name(&self) -> &str {
            "empty"
        }
        fn num_states(&self) -> CellState {
            2
        }
        fn neighborhood(&self) -> &[Offset] {
            &[]
        }
        fn next(&self, _values: &[CellState]) -> CellState {
            0
        }
    }

    #[test]
    fn inverse_negates_each_offset() {
        let n = [Offset::ORIGIN, Offset::new(1, -2), Offset::new(-3, 0)];
        assert_eq!(
            inverse_neighborhood(&n),
            vec![Offset::ORIGIN, Offset::new(-1, 2), Offset::new(3, 0)]
        );
    }

    #[test]
    fn empty_neighborhood_rejected() {
        assert_eq!(validate_rule(&Empty), Err(RuleError::EmptyNeighborhood));
    }
}
