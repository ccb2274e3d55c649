//! Policy extraction and Monte-Carlo policy evaluation.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::core::{MctsError, Result, SearchRng};
use crate::env::Environment;

use super::config::EvaluationConfig;
use super::table::{PolicyTable, ValueTable};

/// Greedy policy: the max-value action of every row.
///
/// Ties are broken uniformly through `rng`; equal seeds give equal tables.
/// Rows without actions are left out.
pub fn greedy_policy<S, A>(table: &ValueTable<S, A>, rng: &mut SearchRng) -> PolicyTable<S, A>
where
    S: Copy + Eq + std::hash::Hash,
    A: Copy,
{
    table
        .iter()
        .filter_map(|(&state, row)| row.greedy(rng).map(|action| (state, action)))
        .collect()
}

/// Play one episode with the epsilon-soft policy derived from `table`.
///
/// Starts from `reset()`. Each step samples from the epsilon-soft
/// distribution of the current state's row and accumulates
/// `discount^t * reward`. Stops at a terminal state, or after `max_steps`
/// steps when non-zero.
///
/// Fails with [`MctsError::InvalidConfig`] when `epsilon` is not in
/// `[0, 1]`, with [`MctsError::MissingState`] when a non-terminal state has
/// no row, and with [`MctsError::NoActions`] when its row is empty.
pub fn evaluate_epsilon_soft_policy<E: Environment>(
    env: &mut E,
    table: &ValueTable<E::State, E::Action>,
    epsilon: f64,
    max_steps: u32,
    rng: &mut SearchRng,
) -> Result<f64> {
    if !(0.0..=1.0).contains(&epsilon) {
        return Err(MctsError::InvalidConfig(format!(
            "epsilon must be in [0, 1], got {}",
            epsilon
        )));
    }

    env.reset();
    let gamma = env.discount();

    let mut state = env.current_state();
    let mut discounted_return = 0.0;
    let mut weight = 1.0;
    let mut steps = 0u32;

    while !env.is_terminal(&state) && (max_steps == 0 || steps < max_steps) {
        let row = table.get(&state).ok_or_else(|| MctsError::MissingState {
            state: format!("{:?}", state),
        })?;
        let action = row
            .sample_epsilon_soft(epsilon, rng)
            .ok_or(MctsError::NoActions)?;

        let step = env.step(action, rng);
        discounted_return += weight * step.reward;
        weight *= gamma;
        steps += 1;
        state = step.state;

        if step.terminal {
            break;
        }
    }

    Ok(discounted_return)
}

/// Summary of repeated policy evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub episodes: u32,
}

impl EvaluationSummary {
    /// Summarize a non-empty slice of episode returns.
    #[must_use]
    pub fn from_returns(returns: &[f64]) -> Self {
        assert!(!returns.is_empty(), "no returns to summarize");

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

        Self {
            mean,
            std_dev: variance.sqrt(),
            min: returns.iter().copied().fold(f64::INFINITY, f64::min),
            max: returns.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            episodes: returns.len() as u32,
        }
    }
}

/// Average `config.episodes` epsilon-soft episodes on `env`.
pub fn evaluate_policy<E: Environment>(
    env: &mut E,
    table: &ValueTable<E::State, E::Action>,
    config: &EvaluationConfig,
) -> Result<EvaluationSummary> {
    config.validate()?;

    let start = Instant::now();
    let mut rng = SearchRng::new(config.seed);
    let returns = (0..config.episodes)
        .map(|_| {
            evaluate_epsilon_soft_policy(env, table, config.epsilon, config.max_episode_steps, &mut rng)
        })
        .collect::<Result<Vec<f64>>>()?;

    let summary = EvaluationSummary::from_returns(&returns);

    log::info!(
        "evaluated {} episodes (epsilon {}): mean {:.3}, std {:.3}, range [{:.3}, {:.3}] in {:.2?}",
        summary.episodes,
        config.epsilon,
        summary.mean,
        summary.std_dev,
        summary.min,
        summary.max,
        start.elapsed(),
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::table::ActionValues;
    use crate::worlds::grid::{GridAction, GridWorld, GridWorldBuilder, Position};

    fn deterministic_toy() -> GridWorld {
        GridWorldBuilder::toy().deterministic().build().unwrap()
    }

    fn down_then_right() -> ValueTable<Position, GridAction> {
        let mut table = ValueTable::new();
        table.insert(
            Position::new(0, 0),
            ActionValues::from_pairs([(GridAction::Down, 5.0), (GridAction::Right, -5.0)]),
        );
        table.insert(
            Position::new(1, 0),
            ActionValues::from_pairs([(GridAction::Up, 0.0), (GridAction::Right, 10.0)]),
        );
        table
    }

    #[test]
    fn test_greedy_policy_picks_max() {
        let mut rng = SearchRng::new(1);
        let policy = greedy_policy(&down_then_right(), &mut rng);

        assert_eq!(policy.get(&Position::new(0, 0)), Some(&GridAction::Down));
        assert_eq!(policy.get(&Position::new(1, 0)), Some(&GridAction::Right));
    }

    #[test]
    fn test_greedy_evaluation_is_exact() {
        let mut env = deterministic_toy();
        let mut rng = SearchRng::new(0);

        let value = evaluate_epsilon_soft_policy(&mut env, &down_then_right(), 0.0, 0, &mut rng).unwrap();
        assert!((value - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_state_is_an_error() {
        let mut env = deterministic_toy();
        let mut table = ValueTable::new();
        table.insert(
            Position::new(0, 0),
            ActionValues::from_pairs([(GridAction::Down, 1.0)]),
        );
        let mut rng = SearchRng::new(0);

        let result = evaluate_epsilon_soft_policy(&mut env, &table, 0.0, 0, &mut rng);
        assert!(matches!(result, Err(MctsError::MissingState { .. })));
    }

    #[test]
    fn test_rejects_epsilon_outside_unit_interval() {
        let mut env = deterministic_toy();
        let mut table = ValueTable::new();
        table.insert(
            Position::new(0, 0),
            ActionValues::from_pairs([(GridAction::Right, 0.0), (GridAction::Down, 3.0)]),
        );
        let mut rng = SearchRng::new(0);

        for epsilon in [2.0, -0.5, f64::NAN, f64::INFINITY] {
            let result = evaluate_epsilon_soft_policy(&mut env, &table, epsilon, 0, &mut rng);
            assert!(
                matches!(result, Err(MctsError::InvalidConfig(_))),
                "epsilon {} accepted",
                epsilon
            );
        }
    }

    #[test]
    fn test_step_cap_truncates_episode() {
        let mut env = deterministic_toy();
        let mut table = ValueTable::new();
        table.insert(
            Position::new(0, 0),
            ActionValues::from_pairs([(GridAction::Up, 1.0)]),
        );
        let mut rng = SearchRng::new(0);

        // Bumping into the wall forever never terminates without the cap
        let value = evaluate_epsilon_soft_policy(&mut env, &table, 0.0, 25, &mut rng).unwrap();
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_summary_statistics() {
        let summary = EvaluationSummary::from_returns(&[1.0, 3.0, 5.0, 7.0]);

        assert_eq!(summary.mean, 4.0);
        assert!((summary.std_dev - 5.0f64.sqrt()).abs() < 1e-12);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 7.0);
        assert_eq!(summary.episodes, 4);
    }

    #[test]
    fn test_evaluate_policy_deterministic_table() {
        let mut env = deterministic_toy();
        let config = EvaluationConfig::default().with_epsilon(0.0).with_episodes(10);

        let summary = evaluate_policy(&mut env, &down_then_right(), &config).unwrap();
        assert!((summary.mean - 9.0).abs() < 1e-12);
        assert!(summary.std_dev.abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_policy_rejects_bad_config() {
        let mut env = deterministic_toy();
        let config = EvaluationConfig::default().with_episodes(0);

        let result = evaluate_policy(&mut env, &down_then_right(), &config);
        assert!(matches!(result, Err(MctsError::InvalidConfig(_))));
    }
}
