//! Environment trait for MDP simulators.
//!
//! Environments implement `Environment` to define:
//! - The fixed action set and the enumerable state set
//! - How a step samples a transition and reward
//! - Which states are terminal or out of bounds

use std::fmt::Debug;
use std::hash::Hash;

use crate::core::SearchRng;

/// Outcome of a single environment step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step<S> {
    /// State after the transition.
    pub state: S,
    /// Reward for entering `state`.
    pub reward: f64,
    /// Whether `state` ends the episode.
    pub terminal: bool,
}

impl<S> Step<S> {
    /// Create a step outcome.
    pub fn new(state: S, reward: f64, terminal: bool) -> Self {
        Self { state, reward, terminal }
    }
}

/// Discrete-state, discrete-action MDP simulator.
///
/// The search engine never interprets states or actions; it only compares
/// them and hands them back to the environment.
///
/// ## Implementation Notes
///
/// - `step` on a terminal state must return `(current, 0.0, true)` and not move
/// - `actions` must be identical for every state
/// - `step` must draw all randomness from the supplied `rng`
pub trait Environment {
    /// Environment state token.
    type State: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    /// Action token.
    type Action: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    /// Return to the designated initial state.
    fn reset(&mut self);

    /// Sample a transition for `action` from the current state.
    fn step(&mut self, action: Self::Action, rng: &mut SearchRng) -> Step<Self::State>;

    /// Overwrite the current state.
    fn set_state(&mut self, state: Self::State);

    /// The current state.
    fn current_state(&self) -> Self::State;

    /// The designated starting state.
    fn initial_state(&self) -> Self::State;

    /// Discount factor in `(0, 1]`.
    fn discount(&self) -> f64;

    /// Fixed ordered set of legal actions.
    fn actions(&self) -> &[Self::Action];

    /// Enumerable reachable, non-forbidden states.
    fn states(&self) -> Vec<Self::State>;

    /// Whether `state` ends an episode.
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Validity predicate for externally supplied states.
    fn in_bounds(&self, state: &Self::State) -> bool;

    // === Convenience Methods ===

    /// Step through `actions` from the current state and return where it lands.
    ///
    /// Used to reposition the environment on a tree node before a rollout.
    /// Deterministic for a given RNG state.
    fn replay_action_path(&mut self, actions: &[Self::Action], rng: &mut SearchRng) -> Self::State {
        for &action in actions {
            self.step(action, rng);
        }
        self.current_state()
    }
}
