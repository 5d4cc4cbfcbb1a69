//! Reusable rule fixtures.
//!
//! - [`ConstRule`] writes one value everywhere, in or out of its alphabet.
//! - [`ToggleRule`] flips every cell every generation.
//! - [`CounterRule`] counts up without wrapping, leaving its alphabet
//!   after `num_states - 1` generations.
//! - [`ShiftRule`] copies a single neighbour, so patterns translate.
//! - [`PanickingRule`] panics on every evaluation.
//! - [`TableRule`] is an arbitrary but pure rule for property tests.

use tessera_core::{CellState, Offset, Rule};

/// Returns `value` for every cell. `value` is not checked against
/// `num_states`, which makes this the out-of-alphabet fixture too.
pub struct ConstRule {
    num_states: CellState,
    value: CellState,
}

impl ConstRule {
    pub fn new(num_states: CellState, value: CellState) -> Self {
        Self { num_states, value }
    }
}

impl Rule for ConstRule {
    fn name(&self) -> &str {
        "const"
    }

    fn num_states(&self) -> CellState {
        self.num_states
    }

    fn neighborhood(&self) -> &[Offset] {
        &[Offset::ORIGIN]
    }

    fn next(&self, _values: &[CellState]) -> CellState {
        self.value
    }
}

/// Two states; every cell inverts itself each generation.
pub struct ToggleRule;

impl Rule for ToggleRule {
    fn name(&self) -> &str {
        "toggle"
    }

    fn num_states(&self) -> CellState {
        2
    }

    fn neighborhood(&self) -> &[Offset] {
        &[Offset::ORIGIN]
    }

    fn next(&self, values: &[CellState]) -> CellState {
        1 - values[0].min(1)
    }
}

/// Every cell adds one to its own state each generation, with no
/// modulus, so a grid started at 0 goes out of range on generation
/// `num_states`.
pub struct CounterRule {
    num_states: CellState,
}

impl CounterRule {
    pub fn new(num_states: CellState) -> Self {
        Self { num_states }
    }
}

impl Rule for CounterRule {
    fn name(&self) -> &str {
        "counter"
    }

    fn num_states(&self) -> CellState {
        self.num_states
    }

    fn neighborhood(&self) -> &[Offset] {
        &[Offset::ORIGIN]
    }

    fn next(&self, values: &[CellState]) -> CellState {
        values[0] + 1
    }
}

/// Every cell takes the state of the cell at `offset`, which moves the
/// whole grid by `-offset` each generation.
pub struct ShiftRule {
    neighborhood: [Offset; 1],
    num_states: CellState,
}

impl ShiftRule {
    pub fn new(offset: Offset, num_states: CellState) -> Self {
        Self {
            neighborhood: [offset],
            num_states,
        }
    }
}

impl Rule for ShiftRule {
    fn name(&self) -> &str {
        "shift"
    }

    fn num_states(&self) -> CellState {
        self.num_states
    }

    fn neighborhood(&self) -> &[Offset] {
        &self.neighborhood
    }

    fn next(&self, values: &[CellState]) -> CellState {
        values[0]
    }
}

/// Panics with a fixed message on every evaluation.
pub struct PanickingRule {
    message: &'static str,
}

impl PanickingRule {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

impl Rule for PanickingRule {
    fn name(&self) -> &str {
        "panicking"
    }

    fn num_states(&self) -> CellState {
        2
    }

    fn neighborhood(&self) -> &[Offset] {
        &[Offset::ORIGIN]
    }

    fn next(&self, _values: &[CellState]) -> CellState {
        panic!("{}", self.message)
    }
}

/// A pure pseudo-random transition table keyed by `salt`.
///
/// The output is a hash of the neighborhood values, so it depends on
/// every declared offset and on nothing else. The all-zero neighborhood
/// maps to zero, keeping a quiescent background quiescent.
pub struct TableRule {
    neighborhood: Vec<Offset>,
    num_states: CellState,
    salt: u64,
}

impl TableRule {
    pub fn new(neighborhood: Vec<Offset>, num_states: CellState, salt: u64) -> Self {
        Self {
            neighborhood,
            num_states,
            salt,
        }
    }
}

impl Rule for TableRule {
    fn name(&self) -> &str {
        "table"
    }

    fn num_states(&self) -> CellState {
        self.num_states
    }

    fn neighborhood(&self) -> &[Offset] {
        &self.neighborhood
    }

    fn next(&self, values: &[CellState]) -> CellState {
        if values.iter().all(|&v| v == 0) {
            return 0;
        }
        // FNV-1a over the values, then a splitmix finaliser.
        let mut h = 0xcbf2_9ce4_8422_2325_u64 ^ self.salt;
        for &v in values {
            h ^= u64::from(v);
            h = h.wrapping_mul(0x0000_0100_0000_01b3);
        }
        h ^= h >> 30;
        h = h.wrapping_mul(0xbf58_476d_1ce4_e5b9);
        h ^= h >> 27;
        (h % u64::from(self.num_states.max(1))) as CellState
    }
}
