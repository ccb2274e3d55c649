//! Whole-state-space planning on top of [`MctsSearch`](crate::mcts::MctsSearch).
//!
//! A [`Planner`] runs one independent search per non-terminal state and
//! records the root children of each search in a [`ValueTable`]. The table
//! can then be turned into a greedy [`PolicyTable`] or scored by running
//! epsilon-soft episodes against the environment.
//!
//! ```rust
//! use mdp_mcts::mcts::SearchConfig;
//! use mdp_mcts::planner::{evaluate_policy, greedy_policy, EvaluationConfig, Planner, PlannerConfig};
//! use mdp_mcts::core::SearchRng;
//! use mdp_mcts::worlds::GridWorld;
//!
//! let config = PlannerConfig::default()
//!     .with_search(SearchConfig::default().with_rollouts(100))
//!     .with_iterations(2);
//! let planner = Planner::new(GridWorld::toy(), config).unwrap();
//! let table = planner.plan().unwrap();
//!
//! let policy = greedy_policy(&table, &mut SearchRng::new(0));
//! assert_eq!(policy.len(), table.len());
//!
//! let mut env = GridWorld::toy();
//! let summary = evaluate_policy(&mut env, &table, &EvaluationConfig::default()).unwrap();
//! println!("mean return {:.2} +/- {:.2}", summary.mean, summary.std_dev);
//! ```

pub mod config;
pub mod orchestrator;
pub mod policy;
pub mod table;

pub use config::{EvaluationConfig, PlannerConfig};
pub use orchestrator::Planner;
pub use policy::{evaluate_epsilon_soft_policy, evaluate_policy, greedy_policy, EvaluationSummary};
pub use table::{ActionValues, PolicyTable, StateMap, ValueTable};
