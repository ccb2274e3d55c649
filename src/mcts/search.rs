//! Core MCTS search algorithm.
//!
//! One `MctsSearch` grows one tree rooted at a fixed environment state. Each
//! rollout runs the four classical phases in order: selection, expansion,
//! simulation, backpropagation.

use std::time::Instant;

use smallvec::SmallVec;

use crate::core::{MctsError, Result, SearchRng};
use crate::env::Environment;

use super::config::SearchConfig;
use super::node::NodeId;
use super::policy::{
    argmax_random, explore_new_branch, RandomRollout, RolloutPolicy, SelectionPolicy, Ucb1,
};
use super::stats::SearchStats;
use super::tree::SearchTree;

/// Main MCTS search context.
///
/// Generic over the environment type. Owns its environment, the search tree,
/// the configuration and the RNG, so independent searches never share
/// mutable state.
pub struct MctsSearch<E: Environment> {
    /// The simulated environment.
    env: E,

    /// Search configuration.
    config: SearchConfig,

    /// State every rollout is replayed from.
    root_state: E::State,

    /// The search tree.
    tree: SearchTree<E::Action>,

    /// RNG for selection, expansion and rollouts.
    rng: SearchRng,

    /// Selection policy among tried children.
    selection: Box<dyn SelectionPolicy<E::Action>>,

    /// Rollout policy.
    rollout: Box<dyn RolloutPolicy<E>>,

    /// Search statistics.
    stats: SearchStats,
}

impl<E: Environment> MctsSearch<E> {
    /// Create a search rooted at `root_state`, seeded from `config.seed`.
    pub fn new(env: E, root_state: E::State, config: SearchConfig) -> Result<Self> {
        let rng = SearchRng::new(config.seed);
        Self::with_rng(env, root_state, config, rng)
    }

    /// Create a search that draws from an explicit RNG instead of `config.seed`.
    ///
    /// Fails before any rollout if the configuration is invalid, the
    /// environment has no actions or an invalid discount, or `root_state` is
    /// out of bounds.
    pub fn with_rng(env: E, root_state: E::State, config: SearchConfig, rng: SearchRng) -> Result<Self> {
        config.validate()?;

        if env.actions().is_empty() {
            return Err(MctsError::NoActions);
        }

        let discount = env.discount();
        if !(discount > 0.0 && discount <= 1.0) {
            return Err(MctsError::InvalidEnvironment(format!(
                "discount must be in (0, 1], got {}",
                discount
            )));
        }

        if !env.in_bounds(&root_state) {
            return Err(MctsError::InitialStateOutOfBounds {
                state: format!("{:?}", root_state),
            });
        }

        let capacity = config.num_rollouts as usize + 1;

        Ok(Self {
            env,
            config,
            root_state,
            tree: SearchTree::with_capacity(capacity),
            rng,
            selection: Box::new(Ucb1),
            rollout: Box::new(RandomRollout),
            stats: SearchStats::default(),
        })
    }

    /// Set a custom selection policy.
    pub fn with_selection<S: SelectionPolicy<E::Action> + 'static>(mut self, selection: S) -> Self {
        self.selection = Box::new(selection);
        self
    }

    /// Set a custom rollout policy.
    pub fn with_rollout<R: RolloutPolicy<E> + 'static>(mut self, rollout: R) -> Self {
        self.rollout = Box::new(rollout);
        self
    }

    /// Run `config.num_rollouts` more rollouts on the current tree.
    ///
    /// Repeated calls keep growing the same tree. Returns the root action
    /// with the highest value (ties broken at random), or `None` if the root
    /// has no children yet.
    pub fn run(&mut self) -> Option<E::Action> {
        let start = Instant::now();

        for _ in 0..self.config.num_rollouts {
            self.iteration();
        }

        self.stats.time_us += start.elapsed().as_micros() as u64;

        log::debug!(
            "search from {:?}: {} rollouts, {} nodes, depth {}, {:.1} steps/rollout",
            self.root_state,
            self.stats.rollouts,
            self.tree.len(),
            self.stats.max_depth,
            self.stats.avg_rollout_length(),
        );

        self.best_action()
    }

    /// Single rollout: select, expand, simulate, backpropagate.
    fn iteration(&mut self) {
        // === SELECTION ===
        let (selected, pending) = self.select();

        // === EXPANSION ===
        let child = self.expand(selected, pending);

        // === SIMULATION ===
        let discounted_return = self.simulate(child);

        // === BACKPROPAGATION ===
        self.tree.backup(child, discounted_return);
        self.stats.rollouts += 1;
    }

    /// Descend from the root while the current node has children.
    ///
    /// Stops early with a pending untried action when the branch-exploration
    /// rule decides to grow a new branch at a partially expanded node.
    fn select(&mut self) -> (NodeId, Option<E::Action>) {
        let mut current = self.tree.root();

        while !self.tree.get(current).is_leaf() {
            let tried = self.tree.tried_actions(current);
            let actions = self.env.actions();

            if tried.len() < actions.len()
                && explore_new_branch(actions, &tried, self.config.branch_exploration, &mut self.rng)
            {
                let untried: SmallVec<[E::Action; 4]> = actions
                    .iter()
                    .copied()
                    .filter(|a| !tried.contains(a))
                    .collect();
                if let Some(&action) = self.rng.choose(&untried[..]) {
                    self.stats.branch_explorations += 1;
                    return (current, Some(action));
                }
            }

            current = self.selection.select(&self.tree, current, &self.config, &mut self.rng);
        }

        (current, None)
    }

    /// Add exactly one child: the pending untried action, or a uniformly
    /// random action at a leaf.
    fn expand(&mut self, node: NodeId, pending: Option<E::Action>) -> NodeId {
        let action = match pending {
            Some(action) => action,
            None => {
                let Some(&action) = self.rng.choose(self.env.actions()) else {
                    panic!("expansion with an empty action set");
                };
                action
            }
        };

        let child = self.tree.add_child(node, action);

        let depth = self.tree.get(child).depth;
        if depth > self.stats.max_depth {
            self.stats.max_depth = depth;
        }
        self.stats.nodes_expanded += 1;

        child
    }

    /// Reposition the environment on `node` and play a random episode.
    ///
    /// The replayed root-to-node path only positions the environment; its
    /// rewards are not part of the returned sum.
    fn simulate(&mut self, node: NodeId) -> f64 {
        let path = self.tree.action_path(node);
        let mut sim_rng = self.rng.fork();

        self.env.set_state(self.root_state);
        let start = self.env.replay_action_path(&path, &mut sim_rng);

        let rollout = self
            .rollout
            .rollout(&mut self.env, &mut sim_rng, self.config.max_rollout_steps);
        self.stats.rollout_steps += u64::from(rollout.steps);

        log::trace!(
            "rollout from {:?} via {:?}: return {:.4} in {} steps",
            start,
            path,
            rollout.discounted_return,
            rollout.steps
        );

        rollout.discounted_return
    }

    /// Greedy root action by value, ties broken at random.
    fn best_action(&mut self) -> Option<E::Action> {
        let children = self.tree.root_children();
        let values: Vec<f64> = children.iter().map(|&(_, value, _)| value).collect();
        argmax_random(&values, &mut self.rng).map(|idx| children[idx].0)
    }

    /// `(action, value, visits)` of each root child in creation order.
    #[must_use]
    pub fn root_values(&self) -> Vec<(E::Action, f64, u32)> {
        self.tree.root_children()
    }

    /// Discard the tree and statistics, keeping the RNG stream.
    pub fn reset(&mut self) {
        self.tree.reset();
        self.stats.reset();
    }

    /// Get search statistics.
    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Get the search tree.
    #[must_use]
    pub fn tree(&self) -> &SearchTree<E::Action> {
        &self.tree
    }

    /// State the tree is rooted at.
    #[must_use]
    pub fn root_state(&self) -> E::State {
        self.root_state
    }

    /// Get the environment reference.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Get the configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Step;
    use crate::worlds::grid::{GridAction, GridWorld, Position};

    fn toy_search(rollouts: u32, seed: u64) -> MctsSearch<GridWorld> {
        let env = GridWorld::toy();
        let root = env.initial_state();
        let config = SearchConfig::default().with_rollouts(rollouts).with_seed(seed);
        MctsSearch::new(env, root, config).unwrap()
    }

    #[test]
    fn test_search_returns_action() {
        let mut search = toy_search(50, 42);
        let action = search.run();

        assert!(action.is_some());
        assert!(GridAction::ALL.contains(&action.unwrap()));
    }

    #[test]
    fn test_one_node_per_rollout() {
        let mut search = toy_search(200, 7);
        search.run();

        assert_eq!(search.tree().len(), 201);
        assert_eq!(search.tree().root_node().visits, 200);
        assert_eq!(search.stats().rollouts, 200);
        assert_eq!(search.stats().nodes_expanded, 200);
    }

    #[test]
    fn test_visit_counts_are_consistent() {
        let mut search = toy_search(300, 3);
        search.run();
        let tree = search.tree();

        for (id, node) in tree.iter() {
            let child_visits: u32 = node.children.iter().map(|&c| tree.get(c).visits).sum();
            if id == tree.root() {
                assert_eq!(node.visits, child_visits);
            } else {
                // One backup when created, one per descendant created later
                assert_eq!(node.visits, child_visits + 1);
                assert!(node.visits <= tree.get(node.parent).visits);
            }
        }
    }

    #[test]
    fn test_search_deterministic() {
        let mut search1 = toy_search(100, 12345);
        let mut search2 = toy_search(100, 12345);

        let action1 = search1.run();
        let action2 = search2.run();

        assert_eq!(action1, action2);
        assert_eq!(search1.root_values(), search2.root_values());
    }

    #[test]
    fn test_repeated_runs_grow_one_tree() {
        let mut search = toy_search(40, 1);
        search.run();
        search.run();

        assert_eq!(search.tree().root_node().visits, 80);
        assert_eq!(search.tree().len(), 81);

        search.reset();
        assert_eq!(search.tree().len(), 1);
        assert_eq!(search.stats().rollouts, 0);
    }

    #[test]
    fn test_root_children_are_unique_actions() {
        let mut search = toy_search(100, 9);
        search.run();

        let actions: Vec<GridAction> = search.root_values().iter().map(|&(a, _, _)| a).collect();
        let mut deduped = actions.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(actions.len(), deduped.len());
        assert!(actions.len() <= 4);
    }

    #[test]
    fn test_rejects_out_of_bounds_root() {
        let env = GridWorld::toy();
        let result = MctsSearch::new(env, Position::new(2, 0), SearchConfig::default());

        assert!(matches!(result, Err(MctsError::InitialStateOutOfBounds { .. })));
    }

    #[test]
    fn test_rejects_obstacle_root() {
        let env = GridWorld::classic();
        let result = MctsSearch::new(env, Position::new(2, 2), SearchConfig::default());

        match result {
            Err(MctsError::InitialStateOutOfBounds { state }) => assert!(state.contains("row: 2")),
            Err(other) => panic!("expected InitialStateOutOfBounds, got {:?}", other),
            Ok(_) => panic!("search rooted at an obstacle"),
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let env = GridWorld::toy();
        let root = env.initial_state();
        let result = MctsSearch::new(env, root, SearchConfig::default().with_rollouts(0));

        assert!(matches!(result, Err(MctsError::InvalidConfig(_))));
    }

    struct Frozen;

    impl Environment for Frozen {
        type State = u8;
        type Action = u8;

        fn reset(&mut self) {}

        fn step(&mut self, _action: u8, _rng: &mut SearchRng) -> Step<u8> {
            Step::new(0, 0.0, true)
        }

        fn set_state(&mut self, _state: u8) {}

        fn current_state(&self) -> u8 {
            0
        }

        fn initial_state(&self) -> u8 {
            0
        }

        fn discount(&self) -> f64 {
            0.9
        }

        fn actions(&self) -> &[u8] {
            &[]
        }

        fn states(&self) -> Vec<u8> {
            vec![0]
        }

        fn is_terminal(&self, _state: &u8) -> bool {
            false
        }

        fn in_bounds(&self, _state: &u8) -> bool {
            true
        }
    }

    #[test]
    fn test_rejects_empty_action_set() {
        let result = MctsSearch::new(Frozen, 0, SearchConfig::default());
        assert!(matches!(result, Err(MctsError::NoActions)));
    }

    #[test]
    fn test_zero_branch_exploration_only_grows_at_leaves() {
        let env = GridWorld::toy();
        let root = env.initial_state();
        let config = SearchConfig::default().with_rollouts(60).with_branch_exploration(0.0);
        let mut search = MctsSearch::new(env, root, config).unwrap();
        search.run();

        // Without branch exploration every node keeps at most one child
        assert_eq!(search.stats().branch_explorations, 0);
        for (_, node) in search.tree().iter() {
            assert!(node.children.len() <= 1);
        }
        assert_eq!(search.stats().max_depth, 60);
    }
}
