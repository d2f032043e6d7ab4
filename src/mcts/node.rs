//! Search node and candidate cursor.
//!
//! Nodes live in an arena and reference each other by `NodeId`. A node's
//! candidate actions are generated lazily on first expansion and consumed
//! one at a time through its cursor, highest prior first.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::rules::MacroAction;

/// Index into the `SearchTree` node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Candidate actions of a node, ordered by descending prior, not yet expanded.
#[derive(Clone, Debug)]
pub struct ActionCursor<P> {
    actions: Vec<MacroAction<P>>,
    next: usize,
}

impl<P: Clone> ActionCursor<P> {
    /// Sort `actions` by descending prior. Equal priors keep their order.
    pub fn new(mut actions: Vec<MacroAction<P>>) -> Self {
        actions.sort_by(|a, b| b.prior.total_cmp(&a.prior));
        Self { actions, next: 0 }
    }

    /// Next unexpanded candidate, or `None` once all were handed out.
    pub fn advance(&mut self) -> Option<MacroAction<P>> {
        let action = self.actions.get(self.next)?.clone();
        self.next += 1;
        Some(action)
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.actions.len() - self.next
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// A node in the search tree.
#[derive(Clone, Debug)]
pub struct SearchNode<S, P> {
    pub state: S,

    /// Parent node (`None` for the root).
    pub parent: Option<NodeId>,

    /// Action that produced this node from its parent.
    pub action: Option<MacroAction<P>>,

    /// Prior of `action` after rescoring; 0 for the root.
    pub prior: f64,

    pub visits: u32,

    /// Sum of backed-up values.
    pub value_sum: f64,

    /// Structural hash of `state`, the transposition key.
    pub hash: u64,

    /// Depth in tree (root = 0).
    pub depth: u16,

    pub children: SmallVec<[NodeId; 8]>,

    /// Lazily generated candidates; `None` until first expansion.
    pub cursor: Option<ActionCursor<P>>,

    /// Set once the cursor ran dry.
    pub fully_expanded: bool,
}

impl<S, P> SearchNode<S, P> {
    pub fn root(state: S, hash: u64) -> Self {
        Self {
            state,
            parent: None,
            action: None,
            prior: 0.0,
            visits: 0,
            value_sum: 0.0,
            hash,
            depth: 0,
            children: SmallVec::new(),
            cursor: None,
            fully_expanded: false,
        }
    }

    pub fn child(state: S, hash: u64, parent: NodeId, depth: u16, action: MacroAction<P>) -> Self {
        let prior = action.prior;
        Self {
            state,
            parent: Some(parent),
            action: Some(action),
            prior,
            visits: 0,
            value_sum: 0.0,
            hash,
            depth,
            children: SmallVec::new(),
            cursor: None,
            fully_expanded: false,
        }
    }

    /// Mean backed-up value; 0 when unvisited.
    #[inline]
    #[must_use]
    pub fn mean_value(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.value_sum / self.visits as f64
        }
    }

    /// Whether progressive widening allows another child right now.
    #[must_use]
    pub fn can_expand(&self, pw_c: f64, pw_alpha: f64) -> bool {
        !self.fully_expanded && self.children.len() < widening_limit(self.visits, pw_c, pw_alpha)
    }
}

/// Children allowed at `visits`: `floor(pw_c * visits^pw_alpha)`.
#[inline]
#[must_use]
pub fn widening_limit(visits: u32, pw_c: f64, pw_alpha: f64) -> usize {
    let limit = (pw_c * f64::from(visits).powf(pw_alpha)).floor();
    if limit.is_finite() && limit > 0.0 {
        limit as usize
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ActionKind;

    #[test]
    fn test_widening_limit() {
        assert_eq!(widening_limit(0, 1.5, 0.6), 0);
        assert_eq!(widening_limit(1, 1.5, 0.6), 1);
        // 1.5 * 10^0.6 = 5.97
        assert_eq!(widening_limit(10, 1.5, 0.6), 5);
        assert_eq!(widening_limit(4, 1.0, 0.5), 2);
    }

    #[test]
    fn test_cursor_orders_by_prior() {
        let mut cursor = ActionCursor::new(vec![
            MacroAction::new(ActionKind::Explore, 0).with_prior(0.2),
            MacroAction::new(ActionKind::Build, 1).with_prior(0.9),
            MacroAction::new(ActionKind::Research, 2).with_prior(0.2),
        ]);
        assert_eq!(cursor.len(), 3);
        assert_eq!(cursor.advance().map(|a| a.payload), Some(1));
        assert_eq!(cursor.advance().map(|a| a.payload), Some(0));
        assert_eq!(cursor.remaining(), 1);
        assert_eq!(cursor.advance().map(|a| a.payload), Some(2));
        assert!(cursor.advance().is_none());
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_node_mean_and_expansion() {
        let mut node: SearchNode<u8, ()> = SearchNode::root(0, 0);
        assert_eq!(node.mean_value(), 0.0);
        assert!(!node.can_expand(1.5, 0.6));

        node.visits = 4;
        node.value_sum = 2.0;
        assert_eq!(node.mean_value(), 0.5);
        assert!(node.can_expand(1.5, 0.6));

        node.fully_expanded = true;
        assert!(!node.can_expand(1.5, 0.6));
    }
}
