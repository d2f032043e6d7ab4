//! Arena-based search tree.

use serde::{Deserialize, Serialize};

use super::node::{NodeId, SearchNode};
use crate::rules::MacroAction;

/// Arena of search nodes. The root is always `NodeId(0)`.
#[derive(Clone, Debug)]
pub struct SearchTree<S, P> {
    nodes: Vec<SearchNode<S, P>>,
}

impl<S, P> SearchTree<S, P> {
    pub fn new(root_state: S, root_hash: u64) -> Self {
        Self::with_capacity(root_state, root_hash, 256)
    }

    pub fn with_capacity(root_state: S, root_hash: u64, capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(1));
        nodes.push(SearchNode::root(root_state, root_hash));
        Self { nodes }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::new(0)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> &SearchNode<S, P> {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode<S, P> {
        &mut self.nodes[id.0 as usize]
    }

    #[must_use]
    pub fn root_node(&self) -> &SearchNode<S, P> {
        self.get(self.root())
    }

    /// Add a child of `parent` reached by `action` and link it.
    pub fn add_child(&mut self, parent: NodeId, state: S, hash: u64, action: MacroAction<P>) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        let depth = self.get(parent).depth.saturating_add(1);
        self.nodes.push(SearchNode::child(state, hash, parent, depth, action));
        self.get_mut(parent).children.push(id);
        id
    }

    /// `id` followed by its ancestors up to the root.
    pub fn path_to_root(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), |n| self.get(*n).parent)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SearchNode<S, P>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId::new(i as u32), n))
    }

    #[must_use]
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            node_count: self.nodes.len(),
            max_depth: self.nodes.iter().map(|n| n.depth).max().unwrap_or(0),
            exhausted_nodes: self.nodes.iter().filter(|n| n.fully_expanded).count(),
            root_children: self.root_node().children.len(),
        }
    }
}

/// Shape of a finished search tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    pub node_count: usize,
    pub max_depth: u16,
    /// Nodes whose candidate list ran out.
    pub exhausted_nodes: usize,
    pub root_children: usize,
}
