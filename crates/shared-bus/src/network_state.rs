//! # Network State
//!
//! Read-only projection of websocket status per node, folded from
//! `WebSocketStatusChanged` actions.

use crate::actions::NodeAction;
use crate::store::StateReducer;
use shared_types::{Node, WebSocketStatus};
use std::collections::BTreeMap;

/// Last known websocket status of every node seen on the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkState {
    nodes: BTreeMap<Node, WebSocketStatus>,
}

impl NetworkState {
    /// Status of `node`, `Disconnected` when never seen.
    #[must_use]
    pub fn status(&self, node: &Node) -> WebSocketStatus {
        self.nodes.get(node).copied().unwrap_or_default()
    }

    /// All nodes with their status.
    pub fn nodes(&self) -> impl Iterator<Item = (&Node, WebSocketStatus)> {
        self.nodes.iter().map(|(node, status)| (node, *status))
    }

    /// Nodes whose websocket is ready.
    pub fn connected_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(|(_, status)| status.is_ready())
            .map(|(node, _)| node)
    }

    /// Number of nodes seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node has been seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Keeps [`NetworkState`] current.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkStateReducer;

impl StateReducer for NetworkStateReducer {
    type State = NetworkState;

    fn initial_state(&self) -> NetworkState {
        NetworkState::default()
    }

    fn reduce(&self, state: &mut NetworkState, action: &NodeAction) -> bool {
        let NodeAction::WebSocketStatusChanged { node, status } = action else {
            return false;
        };
        state.nodes.insert(node.clone(), *status) != Some(*status)
    }
}
