//! Arena-based search tree.
//!
//! Uses a flat `Vec<SearchNode>` with index-based references. Children are
//! owned by the arena slot list of their parent; parent ids never drive
//! destruction, the whole tree is dropped at once.

use smallvec::SmallVec;

use super::node::{NodeId, SearchNode};

/// Arena-based search tree over actions of type `A`.
#[derive(Clone, Debug)]
pub struct SearchTree<A> {
    /// All nodes in the tree.
    nodes: Vec<SearchNode<A>>,

    /// The root node ID (always 0).
    root: NodeId,
}

impl<A: Copy + PartialEq> SearchTree<A> {
    /// Create a new tree with a root node.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a tree with custom initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(1));
        nodes.push(SearchNode::root());
        Self {
            nodes,
            root: NodeId::new(0),
        }
    }

    /// Get the root node ID.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a node by ID.
    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> &SearchNode<A> {
        &self.nodes[id.index()]
    }

    #[inline]
    fn get_mut(&mut self, id: NodeId) -> &mut SearchNode<A> {
        &mut self.nodes[id.index()]
    }

    /// Get the root node.
    #[must_use]
    pub fn root_node(&self) -> &SearchNode<A> {
        self.get(self.root)
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root exists from construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Child of `parent` reached by `action`, if expanded.
    #[must_use]
    pub fn child_for(&self, parent: NodeId, action: A) -> Option<NodeId> {
        self.get(parent)
            .children
            .iter()
            .copied()
            .find(|&child| self.get(child).action == Some(action))
    }

    /// Actions that already own a child of `node`, in creation order.
    #[must_use]
    pub fn tried_actions(&self, node: NodeId) -> SmallVec<[A; 4]> {
        self.get(node)
            .children
            .iter()
            .filter_map(|&child| self.get(child).action)
            .collect()
    }

    /// Attach a new child for `action` under `parent`.
    ///
    /// # Panics
    ///
    /// If `parent` already has a child for `action`. Expansion must only
    /// pick untried actions.
    pub fn add_child(&mut self, parent: NodeId, action: A) -> NodeId {
        assert!(
            self.child_for(parent, action).is_none(),
            "{} already has a child for this action",
            parent
        );

        let depth = self.get(parent).depth + 1;
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(SearchNode::new(action, parent, depth));
        self.get_mut(parent).children.push(id);
        id
    }

    /// UCB1 score of a visited, non-root node.
    ///
    /// `value + c * sqrt(ln(parent.visits) / visits)`
    ///
    /// # Panics
    ///
    /// If the node or its parent has never been visited, or the node is the
    /// root. Selection only scores children that have been backed up.
    #[must_use]
    pub fn ucb_value(&self, id: NodeId, exploration_constant: f64) -> f64 {
        let node = self.get(id);
        assert!(!node.is_root(), "UCB requested for the root node");
        assert!(node.visits > 0, "UCB requested for unvisited {}", id);
        let parent_visits = self.get(node.parent).visits;
        assert!(parent_visits > 0, "UCB requested under unvisited parent of {}", id);

        let exploration = ((parent_visits as f64).ln() / node.visits as f64).sqrt();
        node.value() + exploration_constant * exploration
    }

    /// Add one visit and `amount` of return to `from` and every ancestor.
    pub fn backup(&mut self, from: NodeId, amount: f64) {
        let mut current = from;
        while !current.is_none() {
            let node = self.get_mut(current);
            node.add_visit();
            node.add_return(amount);
            current = node.parent;
        }
    }

    /// Actions from the root down to `id` (empty for the root).
    #[must_use]
    pub fn action_path(&self, id: NodeId) -> Vec<A> {
        let mut path = Vec::with_capacity(self.get(id).depth as usize);
        let mut current = id;
        while !current.is_none() {
            let node = self.get(current);
            if let Some(action) = node.action {
                path.push(action);
            }
            current = node.parent;
        }
        path.reverse();
        path
    }

    /// `(action, value, visits)` of each root child in creation order.
    #[must_use]
    pub fn root_children(&self) -> Vec<(A, f64, u32)> {
        self.root_node()
            .children
            .iter()
            .filter_map(|&child| {
                let node = self.get(child);
                node.action.map(|action| (action, node.value(), node.visits))
            })
            .collect()
    }

    /// Iterate over all nodes.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SearchNode<A>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId::new(i as u32), n))
    }

    /// Get statistics about the tree.
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let max_depth = self.nodes.iter().map(|n| n.depth).max().unwrap_or(0);
        let leaf_count = self.nodes.iter().filter(|n| n.is_leaf()).count();

        TreeStats {
            node_count: self.nodes.len(),
            max_depth,
            leaf_count,
            root_visits: self.root_node().visits,
        }
    }

    /// Clear the tree back to a lone root.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.nodes.push(SearchNode::root());
        self.root = NodeId::new(0);
    }
}

impl<A: Copy + PartialEq> Default for SearchTree<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the search tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeStats {
    /// Total number of nodes.
    pub node_count: usize,

    /// Maximum depth reached.
    pub max_depth: u32,

    /// Nodes without children.
    pub leaf_count: usize,

    /// Backups through the root.
    pub root_visits: u32,
}

impl TreeStats {
    /// Average children per internal node.
    #[must_use]
    pub fn branching_factor(&self) -> f64 {
        let internal = self.node_count - self.leaf_count;
        if internal == 0 {
            0.0
        } else {
            (self.node_count - 1) as f64 / internal as f64
        }
    }
}
