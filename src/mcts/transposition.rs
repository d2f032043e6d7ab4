//! Transposition table keyed by structural state hash.
//!
//! Distinct tree nodes reaching equal states share one aggregate entry.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TranspositionEntry {
    pub visits: u32,
    pub value_sum: f64,
}

impl TranspositionEntry {
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.value_sum / self.visits as f64
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TranspositionTable {
    entries: FxHashMap<u64, TranspositionEntry>,
}

impl TranspositionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, hash: u64, value: f64) {
        let entry = self.entries.entry(hash).or_default();
        entry.visits += 1;
        entry.value_sum += value;
    }

    #[must_use]
    pub fn get(&self, hash: u64) -> Option<&TranspositionEntry> {
        self.entries.get(&hash)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
