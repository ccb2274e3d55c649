//! Monte Carlo Tree Search over an [`Environment`](crate::env::Environment).
//!
//! ## Overview
//!
//! A search grows one tree rooted at a fixed environment state. Every node
//! stands for "took this action from the parent"; its statistics are the
//! discounted returns of the random rollouts backed up through it.
//!
//! - **Selection**: UCB1 among tried children, plus an epsilon-greedy
//!   branch-exploration rule that can stop early to grow an untried action
//! - **Expansion**: exactly one new node per rollout
//! - **Simulation**: replay the root-to-node path, then a uniform random rollout
//! - **Backpropagation**: plain Monte-Carlo averaging up to the root
//!
//! ## Usage
//!
//! ```rust
//! use mdp_mcts::env::Environment;
//! use mdp_mcts::mcts::{MctsSearch, SearchConfig};
//! use mdp_mcts::worlds::GridWorld;
//!
//! let env = GridWorld::toy();
//! let root = env.initial_state();
//! let config = SearchConfig::default().with_rollouts(200).with_seed(7);
//!
//! let mut search = MctsSearch::new(env, root, config).unwrap();
//! if let Some(action) = search.run() {
//!     println!("Best action: {}", action);
//! }
//!
//! for (action, value, visits) in search.root_values() {
//!     println!("{}: {:.2} over {} rollouts", action, value, visits);
//! }
//! ```

pub mod config;
pub mod node;
pub mod policy;
pub mod search;
pub mod stats;
pub mod tree;

// Re-export main types
pub use config::SearchConfig;
pub use node::{NodeId, SearchNode};
pub use policy::{
    argmax_random, epsilon_greedy_probabilities, explore_new_branch, RandomRollout, Rollout,
    RolloutPolicy, SelectionPolicy, Ucb1,
};
pub use search::MctsSearch;
pub use stats::SearchStats;
pub use tree::{SearchTree, TreeStats};
