//! Per-state result tables produced by planning.
//!
//! Tables keep the environment's state-enumeration order so reports and
//! tie-breaks are reproducible, and index states through an `FxHashMap`.

use std::hash::Hash;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::SearchRng;
use crate::mcts::policy::{argmax_random, best_indices, epsilon_greedy_probabilities};

/// Insertion-ordered map from environment state to `T`.
#[derive(Clone, Debug)]
pub struct StateMap<S, T> {
    entries: Vec<(S, T)>,
    index: FxHashMap<S, usize>,
}

impl<S: Copy + Eq + Hash, T> StateMap<S, T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Insert or replace the entry for `state`, keeping its first position.
    pub fn insert(&mut self, state: S, value: T) {
        match self.index.get(&state) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(state, self.entries.len());
                self.entries.push((state, value));
            }
        }
    }

    #[must_use]
    pub fn get(&self, state: &S) -> Option<&T> {
        self.index.get(state).map(|&i| &self.entries[i].1)
    }

    #[must_use]
    pub fn contains(&self, state: &S) -> bool {
        self.index.contains_key(state)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&S, &T)> {
        self.entries.iter().map(|(s, t)| (s, t))
    }

    pub fn states(&self) -> impl Iterator<Item = &S> {
        self.entries.iter().map(|(s, _)| s)
    }
}

impl<S: Copy + Eq + Hash, T> Default for StateMap<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Copy + Eq + Hash, T> FromIterator<(S, T)> for StateMap<S, T> {
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (state, value) in iter {
            map.insert(state, value);
        }
        map
    }
}

/// Root-child statistics of one search: parallel lists of actions, values
/// and visit counts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionValues<A> {
    pub actions: Vec<A>,
    pub values: Vec<f64>,
    pub visits: Vec<u32>,
}

impl<A: Copy> ActionValues<A> {
    /// Build from `(action, value, visits)` triples.
    pub fn from_triples(triples: impl IntoIterator<Item = (A, f64, u32)>) -> Self {
        let mut out = Self {
            actions: Vec::new(),
            values: Vec::new(),
            visits: Vec::new(),
        };
        for (action, value, visits) in triples {
            out.actions.push(action);
            out.values.push(value);
            out.visits.push(visits);
        }
        out
    }

    /// Entries without visit counts, treated as visited once.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (A, f64)>) -> Self {
        Self::from_triples(pairs.into_iter().map(|(a, v)| (a, v, 1)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Highest recorded value, if any.
    #[must_use]
    pub fn max_value(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }

    /// A max-value action, ties broken uniformly at random.
    pub fn greedy(&self, rng: &mut SearchRng) -> Option<A> {
        argmax_random(&self.values, rng).map(|i| self.actions[i])
    }

    /// Epsilon-soft probabilities aligned with `actions`: `epsilon / n` each,
    /// plus `(1 - epsilon)` split over the max-value actions.
    #[must_use]
    pub fn epsilon_soft_probabilities(&self, epsilon: f64) -> Vec<f64> {
        epsilon_greedy_probabilities(self.len(), &best_indices(&self.values), epsilon)
    }

    /// Sample an action from the epsilon-soft distribution.
    pub fn sample_epsilon_soft(&self, epsilon: f64, rng: &mut SearchRng) -> Option<A> {
        let probs = self.epsilon_soft_probabilities(epsilon);
        rng.choose_weighted(&probs).map(|i| self.actions[i])
    }
}

/// Per-state result table: root-child statistics per searched state.
pub type ValueTable<S, A> = StateMap<S, ActionValues<A>>;

/// Policy table: chosen action per state.
pub type PolicyTable<S, A> = StateMap<S, A>;
