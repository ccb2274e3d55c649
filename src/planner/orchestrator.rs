//! Per-state planning: one independent search per non-terminal state.

use std::time::Instant;

use rayon::prelude::*;

use crate::core::{Result, SearchRng};
use crate::env::Environment;
use crate::mcts::MctsSearch;

use super::config::PlannerConfig;
use super::table::{ActionValues, ValueTable};

/// Builds a value table by searching from every non-terminal state.
///
/// The environment is a template: every search gets its own clone, so
/// states never share statistics or environment state.
pub struct Planner<E: Environment + Clone> {
    /// Template environment, cloned per searched state.
    env: E,

    /// Planner configuration.
    config: PlannerConfig,
}

impl<E> Planner<E>
where
    E: Environment + Clone + Send + Sync,
{
    /// Create a planner, validating the configuration.
    pub fn new(env: E, config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { env, config })
    }

    /// Search every non-terminal state and collect root-child statistics.
    ///
    /// Rows follow the environment's state order. Terminal states are absent.
    pub fn plan(&self) -> Result<ValueTable<E::State, E::Action>> {
        let start = Instant::now();
        let states = self.env.states();

        let rows: Vec<(E::State, ActionValues<E::Action>)> = if self.config.parallel {
            states
                .par_iter()
                .enumerate()
                .filter(|(_, state)| !self.env.is_terminal(state))
                .map(|(index, &state)| self.plan_state(index, state).map(|row| (state, row)))
                .collect::<Result<Vec<_>>>()?
        } else {
            states
                .iter()
                .enumerate()
                .filter(|(_, state)| !self.env.is_terminal(state))
                .map(|(index, &state)| self.plan_state(index, state).map(|row| (state, row)))
                .collect::<Result<Vec<_>>>()?
        };

        log::info!(
            "planned {} of {} states ({} rollouts each, {}) in {:.2?}",
            rows.len(),
            states.len(),
            self.config.rollouts_per_state(),
            if self.config.parallel { "parallel" } else { "sequential" },
            start.elapsed(),
        );

        Ok(rows.into_iter().collect())
    }

    /// Search from one state.
    ///
    /// `index` is the state's position in `states()`; it keys the state's
    /// random stream so the result does not depend on scheduling.
    pub fn plan_state(&self, index: usize, state: E::State) -> Result<ActionValues<E::Action>> {
        let rng = self.state_rng(index);
        let mut search = MctsSearch::with_rng(self.env.clone(), state, self.config.search.clone(), rng)?;

        for _ in 0..self.config.num_iterations {
            search.run();
        }

        let row = ActionValues::from_triples(search.root_values());

        log::debug!(
            "state {:?}: {} root actions, {} nodes, best value {:?}",
            state,
            row.len(),
            search.tree().len(),
            row.max_value(),
        );

        Ok(row)
    }

    fn state_rng(&self, index: usize) -> SearchRng {
        SearchRng::new(self.config.search.seed).stream(index as u64)
    }

    /// Template environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Get the configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }
}
