//! # WebSocket Closer
//!
//! Closes a socket some time after it was last needed, skipping the close
//! if a listener registered in the meantime.

use crate::domain::{CloseResult, CloseStrategy, DEFAULT_CLOSE_DELAY};
use crate::service::manager::WebSocketsManager;
use shared_types::Node;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Delayed `SkipIfInUse` close through the manager.
#[derive(Clone)]
pub struct WebSocketCloser {
    manager: WebSocketsManager,
    delay: Duration,
}

impl WebSocketCloser {
    /// Closer with a custom delay.
    #[must_use]
    pub fn new(manager: WebSocketsManager, delay: Duration) -> Self {
        Self { manager, delay }
    }

    /// Closer with the default five second delay.
    #[must_use]
    pub fn by_web_sockets(manager: WebSocketsManager) -> Self {
        Self::new(manager, DEFAULT_CLOSE_DELAY)
    }

    /// Delay before each close attempt.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule a close of the socket to `node`.
    pub fn close_web_socket_to(&self, node: Node) -> JoinHandle<()> {
        let manager = self.manager.clone();
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match manager
                .try_close_socket_to(&node, CloseStrategy::SkipIfInUse)
                .await
            {
                Ok(CloseResult::Closed) => debug!(node = %node, "Closed unused websocket"),
                Ok(result) => debug!(node = %node, result = %result, "Websocket kept open"),
                Err(e) => warn!(node = %node, error = %e, "Failed to close websocket"),
            }
        })
    }
}
