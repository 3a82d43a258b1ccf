//! Driven Ports (SPI - Outbound Dependencies)
//!
//! A dialer opens one websocket and hands back a pair of channels. The
//! socket is closed by dropping the outgoing sender.

use crate::domain::ConnectionError;
use async_trait::async_trait;
use shared_types::Node;
use tokio::sync::mpsc;

/// What the remote end of a websocket produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A text frame.
    Text(String),
    /// The socket closed cleanly.
    Closed,
    /// The socket broke.
    Failed(String),
}

/// An open websocket.
#[derive(Debug)]
pub struct WebSocketLink {
    /// Text frames to write. Dropping it closes the socket.
    pub outgoing: mpsc::UnboundedSender<String>,
    /// Frames and the final close or failure.
    pub incoming: mpsc::UnboundedReceiver<LinkEvent>,
}

/// Opens websockets to nodes.
#[async_trait]
pub trait WebSocketDialer: Send + Sync {
    /// Perform the handshake with `node`.
    async fn dial(&self, node: &Node) -> Result<WebSocketLink, ConnectionError>;
}
