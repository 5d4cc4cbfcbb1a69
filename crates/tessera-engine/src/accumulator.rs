//! Per-generation change accumulation and peer-diff compression.
//!
//! The runner merges every generation's diff into an [`Accumulator`];
//! a pull drains it wholesale. Before the drained entries leave the
//! process they are filtered through a [`PeerCache`] holding the last
//! value the peer received for each cell, so a cell that flickered and
//! settled back on its old value is never resent.

use tessera_core::{CellDiff, CellState, Coord, Grid};

/// Latest value per cell since the last drain.
#[derive(Debug, Default)]
pub struct Accumulator {
    pending: CellDiff,
}

impl Accumulator {
    /// An empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a generation's diff in; later values overwrite earlier ones.
    pub fn merge(&mut self, diff: &CellDiff) {
        for (&at, &value) in diff {
            self.pending.insert(at, value);
        }
    }

    /// Swap the contents out for an empty map and return them.
    pub fn drain(&mut self) -> CellDiff {
        std::mem::take(&mut self.pending)
    }

    /// Put back entries from an earlier drain that never reached the peer.
    /// Cells merged since that drain keep their newer value.
    pub fn restore(&mut self, older: CellDiff) {
        for (at, value) in older {
            self.pending.entry(at).or_insert(value);
        }
    }

    /// Discard everything pending.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Number of cells pending.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Last value transmitted to the peer, per cell.
///
/// Dense and sized to the grid. A reset fills it with the grid's default
/// state, which is what a freshly initialised peer already shows.
#[derive(Debug)]
pub struct PeerCache {
    known: Option<Grid>,
}

impl PeerCache {
    /// A cache with no baseline; every entry counts as novel.
    pub fn new() -> Self {
        Self { known: None }
    }

    /// Forget everything and assume the peer shows `baseline` everywhere.
    pub fn reset(&mut self, dimension: u32, baseline: CellState) {
        self.known = Grid::new(dimension, baseline).ok();
    }

    /// Keep only entries whose value differs from what the peer last saw,
    /// and record them as seen.
    pub fn filter(&mut self, drained: CellDiff) -> CellDiff {
        let novel = self.novel(&drained);
        self.commit(&novel);
        novel
    }

    /// Entries of `drained` the peer has not seen yet. Nothing is recorded.
    pub fn novel(&self, drained: &CellDiff) -> CellDiff {
        let Some(known) = self.known.as_ref() else {
            return drained.clone();
        };
        drained
            .iter()
            .filter(|&(&at, &value)| known.check(at).is_err() || known.get(at) != value)
            .map(|(&at, &value)| (at, value))
            .collect()
    }

    /// Record every entry of `sent` as delivered.
    pub fn commit(&mut self, sent: &CellDiff) {
        for (&at, &value) in sent {
            self.record(at, value);
        }
    }

    /// Note that the peer already holds `value` at `at`.
    pub fn record(&mut self, at: Coord, value: CellState) {
        if let Some(known) = self.known.as_mut() {
            if known.check(at).is_ok() {
                known.set(at, value);
            }
        }
    }
}

impl Default for PeerCache {
    fn default() -> Self {
        Self::new()
    }
}
