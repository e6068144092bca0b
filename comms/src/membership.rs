use std::collections::HashMap;

use log::info;
use parking_lot::Mutex;

/// Identifier of a node inside the cluster.
pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    Up,
    Down,
}

/// Cluster membership boundary, decoupled from any transport.
///
/// The coordinator only ever issues `down` followed by `leave` for itself at
/// termination; everything else exists for the surrounding runtime.
pub trait Membership: Send + Sync {
    /// Registers `node` as a live member.
    fn join(&self, node: NodeId);

    /// Removes `node` from the membership group entirely.
    fn leave(&self, node: NodeId);

    /// Marks `node` as down without removing it.
    fn down(&self, node: NodeId);

    /// Whether `node` is currently a live member.
    fn is_alive(&self, node: NodeId) -> bool;
}

/// In-process membership roster.
#[derive(Default)]
pub struct LocalRoster {
    nodes: Mutex<HashMap<NodeId, NodeStatus>>,
}

impl LocalRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes currently tracked, down nodes included.
    pub fn len(&self) -> usize {
        self.nodes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.lock().is_empty()
    }
}

impl Membership for LocalRoster {
    fn join(&self, node: NodeId) {
        self.nodes.lock().insert(node, NodeStatus::Up);
        info!(node = node; "node joined");
    }

    fn leave(&self, node: NodeId) {
        self.nodes.lock().remove(&node);
        info!(node = node; "node left");
    }

    fn down(&self, node: NodeId) {
        if let Some(status) = self.nodes.lock().get_mut(&node) {
            *status = NodeStatus::Down;
        }
        info!(node = node; "node marked down");
    }

    fn is_alive(&self, node: NodeId) -> bool {
        self.nodes.lock().get(&node).copied() == Some(NodeStatus::Up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_then_leave() {
        let roster = LocalRoster::new();
        roster.join(3);
        assert!(roster.is_alive(3));
        assert_eq!(roster.len(), 1);

        roster.leave(3);
        assert!(!roster.is_alive(3));
        assert!(roster.is_empty());
    }

    #[test]
    fn down_keeps_the_node_but_not_alive() {
        let roster = LocalRoster::new();
        roster.join(1);
        roster.down(1);
        assert!(!roster.is_alive(1));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn unknown_nodes_are_not_alive() {
        let roster = LocalRoster::new();
        assert!(!roster.is_alive(9));
    }
}
