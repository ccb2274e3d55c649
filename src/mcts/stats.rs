//! Search statistics for diagnostics and tuning.

use serde::{Deserialize, Serialize};

/// Statistics collected across `MctsSearch::run` calls.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Rollouts performed (one per select/expand/simulate/backup cycle).
    pub rollouts: u32,

    /// Nodes added to the tree.
    pub nodes_expanded: u32,

    /// Expansions triggered by the branch-exploration rule rather than
    /// by reaching a leaf.
    pub branch_explorations: u32,

    /// Maximum depth of an expanded node.
    pub max_depth: u32,

    /// Environment steps taken by random rollouts.
    pub rollout_steps: u64,

    /// Total time spent searching (microseconds).
    pub time_us: u64,
}

impl SearchStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all statistics to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Calculate rollouts per second.
    #[must_use]
    pub fn rollouts_per_second(&self) -> f64 {
        if self.time_us == 0 {
            0.0
        } else {
            self.rollouts as f64 / (self.time_us as f64 / 1_000_000.0)
        }
    }

    /// Average random steps per rollout.
    #[must_use]
    pub fn avg_rollout_length(&self) -> f64 {
        if self.rollouts == 0 {
            0.0
        } else {
            self.rollout_steps as f64 / self.rollouts as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_default() {
        let stats = SearchStats::new();
        assert_eq!(stats.rollouts, 0);
        assert_eq!(stats.avg_rollout_length(), 0.0);
    }

    #[test]
    fn test_stats_rates() {
        let mut stats = SearchStats::new();
        stats.rollouts = 1000;
        stats.rollout_steps = 4500;
        stats.time_us = 500_000;

        assert_eq!(stats.rollouts_per_second(), 2000.0);
        assert_eq!(stats.avg_rollout_length(), 4.5);
    }

    #[test]
    fn test_stats_reset() {
        let mut stats = SearchStats::new();
        stats.rollouts = 100;
        stats.nodes_expanded = 50;

        stats.reset();

        assert_eq!(stats, SearchStats::default());
    }
}
