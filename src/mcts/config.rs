//! MCTS configuration parameters.

use serde::{Deserialize, Serialize};

use crate::core::{MctsError, Result};

/// MCTS configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// UCB1 exploration constant (default: sqrt(2) = 1.414).
    /// Higher values favor exploration over exploitation.
    pub exploration_constant: f64,

    /// Epsilon of the branch-exploration rule (default: 0.5).
    /// At a partially expanded node, the chance of growing a new branch
    /// is `branch_exploration * untried / actions`.
    pub branch_exploration: f64,

    /// Rollouts performed per call to `MctsSearch::run`.
    pub num_rollouts: u32,

    /// Maximum random steps per rollout (0 = until terminal).
    pub max_rollout_steps: u32,

    /// Random seed for the search RNG.
    /// Same seed produces deterministic searches.
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exploration_constant: std::f64::consts::SQRT_2,
            branch_exploration: 0.5,
            num_rollouts: 100,
            max_rollout_steps: 0,
            seed: 42,
        }
    }
}

impl SearchConfig {
    /// Set the UCB1 exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Set the branch-exploration epsilon.
    pub fn with_branch_exploration(mut self, epsilon: f64) -> Self {
        self.branch_exploration = epsilon;
        self
    }

    /// Set the rollouts per run.
    pub fn with_rollouts(mut self, rollouts: u32) -> Self {
        self.num_rollouts = rollouts;
        self
    }

    /// Cap the length of each random rollout.
    pub fn with_max_rollout_steps(mut self, steps: u32) -> Self {
        self.max_rollout_steps = steps;
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject parameters the search cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(MctsError::InvalidConfig(format!(
                "exploration_constant must be finite and non-negative, got {}",
                self.exploration_constant
            )));
        }
        if !(0.0..=1.0).contains(&self.branch_exploration) {
            return Err(MctsError::InvalidConfig(format!(
                "branch_exploration must be in [0, 1], got {}",
                self.branch_exploration
            )));
        }
        if self.num_rollouts == 0 {
            return Err(MctsError::InvalidConfig("num_rollouts must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert!((config.exploration_constant - std::f64::consts::SQRT_2).abs() < 0.001);
        assert_eq!(config.branch_exploration, 0.5);
        assert_eq!(config.max_rollout_steps, 0);
        assert_eq!(config.seed, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = SearchConfig::default()
            .with_exploration(2.0)
            .with_branch_exploration(0.25)
            .with_rollouts(50)
            .with_seed(123);

        assert_eq!(config.exploration_constant, 2.0);
        assert_eq!(config.branch_exploration, 0.25);
        assert_eq!(config.num_rollouts, 50);
        assert_eq!(config.seed, 123);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(SearchConfig::default().with_rollouts(0).validate().is_err());
        assert!(SearchConfig::default().with_exploration(-1.0).validate().is_err());
        assert!(SearchConfig::default().with_exploration(f64::NAN).validate().is_err());
        assert!(SearchConfig::default().with_branch_exploration(1.5).validate().is_err());
        assert!(SearchConfig::default().with_branch_exploration(0.0).validate().is_ok());
    }

    #[test]
    fn test_serialization() {
        let config = SearchConfig::default().with_seed(7);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: SearchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
