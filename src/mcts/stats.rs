//! Search statistics for diagnostics and tuning.

use serde::{Deserialize, Serialize};

/// Counters collected during one `plan` call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    pub simulations: u32,

    /// Nodes added to the tree.
    pub expansions: u32,

    pub rollouts: u32,

    /// Leaf evaluations that failed and were scored as 0.
    pub evaluator_failures: u32,

    /// Nodes whose candidate list ran out.
    pub exhausted_nodes: u32,

    pub max_depth: u16,

    /// Distinct states in the transposition table.
    pub transposition_entries: usize,

    /// Total time spent searching (microseconds).
    pub time_us: u64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn simulations_per_second(&self) -> f64 {
        if self.time_us == 0 {
            0.0
        } else {
            self.simulations as f64 / (self.time_us as f64 / 1_000_000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulations_per_second() {
        let mut stats = SearchStats::new();
        assert_eq!(stats.simulations_per_second(), 0.0);
        stats.simulations = 500;
        stats.time_us = 500_000;
        assert_eq!(stats.simulations_per_second(), 1000.0);
    }

    #[test]
    fn test_reset() {
        let mut stats = SearchStats::new();
        stats.rollouts = 3;
        stats.evaluator_failures = 1;
        stats.reset();
        assert_eq!(stats, SearchStats::default());
    }
}
