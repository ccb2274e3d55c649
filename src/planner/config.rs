//! Planner and evaluation configuration.

use serde::{Deserialize, Serialize};

use crate::core::{MctsError, Result};
use crate::mcts::SearchConfig;

/// Configuration for building a whole-state-space plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Per-state search settings. `search.seed` is the base seed; every
    /// state derives its own stream from it.
    pub search: SearchConfig,

    /// Number of `run` calls per state. All calls grow the same tree.
    pub num_iterations: u32,

    /// Search states on the rayon thread pool.
    pub parallel: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            num_iterations: 1,
            parallel: false,
        }
    }
}

impl PlannerConfig {
    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    pub fn with_iterations(mut self, n: u32) -> Self {
        self.num_iterations = n;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Shorthand for `search.seed`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.search.seed = seed;
        self
    }

    /// Total rollouts spent on each searched state.
    #[must_use]
    pub fn rollouts_per_state(&self) -> u64 {
        u64::from(self.num_iterations) * u64::from(self.search.num_rollouts)
    }

    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        if self.num_iterations == 0 {
            return Err(MctsError::InvalidConfig(
                "num_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for Monte-Carlo evaluation of a value table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Probability mass spread uniformly over all actions.
    pub epsilon: f64,

    /// Number of episodes averaged.
    pub episodes: u32,

    /// Step cap per episode, 0 for unlimited.
    pub max_episode_steps: u32,

    /// Seed for action sampling and transitions.
    pub seed: u64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.1,
            episodes: 100,
            max_episode_steps: 0,
            seed: 42,
        }
    }
}

impl EvaluationConfig {
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_episodes(mut self, episodes: u32) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_max_episode_steps(mut self, steps: u32) -> Self {
        self.max_episode_steps = steps;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(MctsError::InvalidConfig(format!(
                "epsilon must be in [0, 1], got {}",
                self.epsilon
            )));
        }
        if self.episodes == 0 {
            return Err(MctsError::InvalidConfig(
                "episodes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
