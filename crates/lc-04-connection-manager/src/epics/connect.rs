//! # Connect WebSocket Epic
//!
//! Turns `ConnectWebSocket` and `CloseWebSocket` actions into manager calls
//! and reports every socket status change back as an action.

use crate::service::{WebSocketCloser, WebSocketsManager};
use async_trait::async_trait;
use shared_bus::{ActionFilter, ActionKind, Epic, EpicContext, NodeAction, Subscription};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Opens and closes sockets on request.
pub struct ConnectWebSocketEpic {
    manager: WebSocketsManager,
    closer: WebSocketCloser,
}

impl ConnectWebSocketEpic {
    /// Epic over an explicit closer.
    #[must_use]
    pub fn new(manager: WebSocketsManager, closer: WebSocketCloser) -> Self {
        Self { manager, closer }
    }

    /// Epic closing through the manager with the default delay.
    #[must_use]
    pub fn by_web_sockets(manager: WebSocketsManager) -> Self {
        let closer = WebSocketCloser::by_web_sockets(manager.clone());
        Self::new(manager, closer)
    }

    fn forward_statuses(&self, ctx: &EpicContext) -> JoinHandle<()> {
        let mut updates = self.manager.status_updates();
        let dispatcher = ctx.dispatcher();
        tokio::spawn(async move {
            loop {
                let update = match updates.recv().await {
                    Ok(update) => update,
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        warn!(lagged = count, "Status forwarder lagged, some updates dropped");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let action = NodeAction::WebSocketStatusChanged {
                    node: update.node,
                    status: update.status,
                };
                if dispatcher.dispatch(action).is_err() {
                    break;
                }
            }
        })
    }
}

/// Aborts the wrapped task when dropped.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[async_trait]
impl Epic for ConnectWebSocketEpic {
    fn name(&self) -> &'static str {
        "connect-websocket"
    }

    fn filter(&self) -> ActionFilter {
        ActionFilter::kinds(vec![ActionKind::WebSocketCommand])
    }

    async fn run(self: Arc<Self>, mut actions: Subscription, ctx: EpicContext) {
        let _forwarder = AbortOnDrop(self.forward_statuses(&ctx));

        while let Some(action) = actions.recv().await {
            match action {
                NodeAction::ConnectWebSocket { node } => {
                    debug!(node = %node, "Connect requested");
                    let manager = self.manager.clone();
                    tokio::spawn(async move {
                        match manager.socket_to(&node).await {
                            Ok(socket) => socket.connect(),
                            Err(e) => warn!(node = %node, error = %e, "Cannot connect websocket"),
                        }
                    });
                }
                NodeAction::CloseWebSocket { node } => {
                    debug!(node = %node, "Close requested");
                    self.closer.close_web_socket_to(node);
                }
                _ => {}
            }
        }
    }
}
