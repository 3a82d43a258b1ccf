//! # Find A Node Epic
//!
//! Answers `FindANodeRequest` from a fixed node list. A node whose websocket
//! is already connected wins, so submissions reuse open connections.

use async_trait::async_trait;
use shared_bus::{ActionFilter, ActionKind, Epic, EpicContext, NetworkState, NodeAction, Subscription};
use shared_types::Node;
use std::sync::Arc;
use tracing::{debug, warn};

/// Picks a node for each submission from configured nodes.
#[derive(Debug, Clone)]
pub struct FindANodeEpic {
    nodes: Vec<Node>,
}

impl FindANodeEpic {
    /// Epic choosing among `nodes`, in order of preference.
    #[must_use]
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Configured nodes.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// First connected node, else the first configured one.
    #[must_use]
    pub fn choose(&self, network: &NetworkState) -> Option<Node> {
        self.nodes
            .iter()
            .find(|node| network.status(node).is_ready())
            .or_else(|| self.nodes.first())
            .cloned()
    }
}

#[async_trait]
impl Epic for FindANodeEpic {
    fn name(&self) -> &'static str {
        "find-a-node"
    }

    fn filter(&self) -> ActionFilter {
        ActionFilter::kinds(vec![ActionKind::FindANode])
    }

    async fn run(self: Arc<Self>, mut actions: Subscription, ctx: EpicContext) {
        while let Some(action) = actions.recv().await {
            let NodeAction::FindANodeRequest { uuid, shards } = action else {
                continue;
            };
            let node = self.choose(&ctx.network_state());
            match &node {
                Some(node) => debug!(uuid = %uuid, node = %node, shards = shards.len(), "Found node"),
                None => warn!(uuid = %uuid, "No node configured"),
            }
            if ctx.dispatch(NodeAction::FindANodeResult { uuid, node }).is_err() {
                break;
            }
        }
    }
}
