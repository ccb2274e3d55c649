//! Search node structures.
//!
//! Uses arena-based allocation with index references (NodeId). A node owns
//! its children through their ids; the parent id is a lookup-only back
//! reference.

use smallvec::SmallVec;

/// Index into the `SearchTree` node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value representing no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Create a new node ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Check if this is the NONE sentinel.
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    /// Arena slot of this id.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "NodeId(NONE)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

/// A node in the search tree: "took `action` from the parent".
#[derive(Clone, Debug)]
pub struct SearchNode<A> {
    /// Action leading into this node (`None` for the root).
    pub action: Option<A>,

    /// Parent node (NONE for root).
    pub parent: NodeId,

    /// Depth in tree (root = 0).
    pub depth: u32,

    /// Children in creation order, at most one per action.
    /// SmallVec covers the usual four grid moves without allocating.
    pub children: SmallVec<[NodeId; 4]>,

    /// Number of backups applied to this node.
    pub visits: u32,

    /// Sum of discounted returns backed up through this node.
    pub total_return: f64,
}

impl<A> SearchNode<A> {
    /// Create a child node reached by `action`.
    pub fn new(action: A, parent: NodeId, depth: u32) -> Self {
        Self {
            action: Some(action),
            parent,
            depth,
            children: SmallVec::new(),
            visits: 0,
            total_return: 0.0,
        }
    }

    /// Create a root node.
    pub fn root() -> Self {
        Self {
            action: None,
            parent: NodeId::NONE,
            depth: 0,
            children: SmallVec::new(),
            visits: 0,
            total_return: 0.0,
        }
    }

    /// Mean backed-up return, 0 for an unvisited node.
    #[must_use]
    pub fn value(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.total_return / self.visits as f64
        }
    }

    /// True iff no children exist.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn add_visit(&mut self) {
        self.visits += 1;
    }

    pub fn add_return(&mut self, amount: f64) {
        self.total_return += amount;
    }
}
