//! # mdp-mcts
//!
//! Monte Carlo Tree Search planning for small stochastic discrete MDPs.
//!
//! ## Design Principles
//!
//! 1. **Environment as a trait**: Search and planning only see the
//!    [`Environment`] contract. Domains plug in their own state and action
//!    types.
//!
//! 2. **Explicit randomness**: Every random draw goes through a seeded
//!    [`SearchRng`]. Equal seeds give equal trees, tables and returns,
//!    sequential or parallel.
//!
//! 3. **Independent searches**: Each search owns its environment clone, its
//!    tree and its RNG stream. Nothing is shared between states.
//!
//! ## Modules
//!
//! - `core`: RNG and error types
//! - `env`: The `Environment` trait
//! - `mcts`: Single-root search (tree, selection, rollouts, backup)
//! - `planner`: Per-state orchestration, greedy policies, evaluation
//! - `worlds`: Reference grid-world environments

pub mod core;
pub mod env;
pub mod mcts;
pub mod planner;
pub mod worlds;

// Re-export commonly used types
pub use crate::core::{MctsError, Result, SearchRng};

pub use crate::env::{Environment, Step};

pub use crate::mcts::{
    MctsSearch, NodeId, RandomRollout, RolloutPolicy, SearchConfig, SearchNode, SearchStats,
    SearchTree, SelectionPolicy, TreeStats, Ucb1,
};

pub use crate::planner::{
    evaluate_epsilon_soft_policy, evaluate_policy, greedy_policy, ActionValues, EvaluationConfig,
    EvaluationSummary, Planner, PlannerConfig, PolicyTable, ValueTable,
};

pub use crate::worlds::{GridAction, GridWorld, GridWorldBuilder, Position};
