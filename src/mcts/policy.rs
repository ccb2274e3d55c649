//! MCTS policies for selection, branch exploration and rollouts.
//!
//! Policies are trait-based to allow customization:
//! - `SelectionPolicy`: How to choose which existing child to descend into (UCB1)
//! - `RolloutPolicy`: How to play out an episode from a leaf (uniform random)
//!
//! The epsilon-greedy helpers are shared with policy evaluation in the
//! planner.

use crate::core::SearchRng;
use crate::env::Environment;

use super::config::SearchConfig;
use super::node::NodeId;
use super::tree::SearchTree;

// =============================================================================
// Selection Policy
// =============================================================================

/// Policy for selecting which child node to descend into.
pub trait SelectionPolicy<A>: Send + Sync {
    /// Select a child of `node`. `node` has at least one child and every
    /// child has been visited.
    fn select(
        &self,
        tree: &SearchTree<A>,
        node: NodeId,
        config: &SearchConfig,
        rng: &mut SearchRng,
    ) -> NodeId;
}

/// UCB1 (Upper Confidence Bound) selection policy.
///
/// Formula: Q(a) + c * sqrt(ln(N) / n(a)), ties broken uniformly at random.
#[derive(Clone, Debug, Default)]
pub struct Ucb1;

impl<A: Copy + PartialEq> SelectionPolicy<A> for Ucb1 {
    fn select(
        &self,
        tree: &SearchTree<A>,
        node: NodeId,
        config: &SearchConfig,
        rng: &mut SearchRng,
    ) -> NodeId {
        let children = &tree.get(node).children;
        let scores: Vec<f64> = children
            .iter()
            .map(|&child| tree.ucb_value(child, config.exploration_constant))
            .collect();

        match argmax_random(&scores, rng) {
            Some(idx) => children[idx],
            None => panic!("selection at {} which has no children", node),
        }
    }
}

// =============================================================================
// Rollout Policy
// =============================================================================

/// Policy for playing out an episode from the environment's current state.
pub trait RolloutPolicy<E: Environment>: Send + Sync {
    /// Step `env` until terminal (or `max_steps` when non-zero) and return
    /// the discounted return `sum_t gamma^t * r_t`, `t` starting at 0.
    fn rollout(&self, env: &mut E, rng: &mut SearchRng, max_steps: u32) -> Rollout;
}

/// Result of one rollout.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rollout {
    /// Discounted return.
    pub discounted_return: f64,
    /// Steps taken.
    pub steps: u32,
}

/// Uniform random rollout policy.
#[derive(Clone, Debug, Default)]
pub struct RandomRollout;

impl<E: Environment> RolloutPolicy<E> for RandomRollout {
    fn rollout(&self, env: &mut E, rng: &mut SearchRng, max_steps: u32) -> Rollout {
        let gamma = env.discount();
        let mut weight = 1.0;
        let mut result = Rollout::default();

        loop {
            if max_steps > 0 && result.steps >= max_steps {
                return result;
            }

            let actions = env.actions();
            let action = actions[rng.gen_range_usize(0..actions.len())];
            let step = env.step(action, rng);

            result.discounted_return += weight * step.reward;
            result.steps += 1;
            weight *= gamma;

            if step.terminal {
                return result;
            }
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Index of the maximum value, ties broken uniformly at random.
///
/// Returns `None` for an empty slice. Exact float equality defines a tie.
pub fn argmax_random(values: &[f64], rng: &mut SearchRng) -> Option<usize> {
    let best = best_indices(values);
    match best.len() {
        0 => None,
        1 => Some(best[0]),
        n => Some(best[rng.gen_range_usize(0..n)]),
    }
}

/// All indices holding the maximum value.
pub fn best_indices(values: &[f64]) -> Vec<usize> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    values
        .iter()
        .enumerate()
        .filter(|(_, &v)| v == max)
        .map(|(i, _)| i)
        .collect()
}

/// Epsilon-greedy probabilities over `num_actions` actions.
///
/// Every action gets `epsilon / num_actions`; each of the `favored` indices
/// additionally gets `(1 - epsilon) / favored.len()`. With no favored
/// indices the distribution is uniform.
pub fn epsilon_greedy_probabilities(num_actions: usize, favored: &[usize], epsilon: f64) -> Vec<f64> {
    if num_actions == 0 {
        return Vec::new();
    }
    if favored.is_empty() {
        return vec![1.0 / num_actions as f64; num_actions];
    }

    let mut probs = vec![epsilon / num_actions as f64; num_actions];
    let bonus = (1.0 - epsilon) / favored.len() as f64;
    for &i in favored {
        probs[i] += bonus;
    }
    probs
}

/// Branch-exploration decision at a partially expanded node.
///
/// Samples an action from the epsilon-greedy distribution that favors the
/// `tried` actions and reports whether the sample was untried.
pub fn explore_new_branch<A: PartialEq>(
    actions: &[A],
    tried: &[A],
    epsilon: f64,
    rng: &mut SearchRng,
) -> bool {
    let favored: Vec<usize> = actions
        .iter()
        .enumerate()
        .filter(|(_, a)| tried.contains(a))
        .map(|(i, _)| i)
        .collect();
    let probs = epsilon_greedy_probabilities(actions.len(), &favored, epsilon);

    match rng.choose_weighted(&probs) {
        Some(idx) => !tried.contains(&actions[idx]),
        None => false,
    }
}
