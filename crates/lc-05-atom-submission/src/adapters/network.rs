//! Socket ports over [`WebSocketsManager`] and [`WebSocketCloser`].

use crate::ports::{WebSocketClosing, WebSocketConnecting};
use async_trait::async_trait;
use lc_04_connection_manager::{ConnectionError, WebSocketCloser, WebSocketToNode, WebSocketsManager};
use shared_types::Node;
use std::sync::Arc;

#[async_trait]
impl WebSocketConnecting for WebSocketsManager {
    async fn connect(&self, node: &Node) -> Result<Arc<WebSocketToNode>, ConnectionError> {
        WebSocketsManager::connect(self, node).await
    }
}

impl WebSocketClosing for WebSocketCloser {
    fn close_web_socket_to(&self, node: &Node) {
        // The delayed close runs detached.
        drop(WebSocketCloser::close_web_socket_to(self, node.clone()));
    }
}
