//! # Domain Errors
//!
//! Error types for connections and the JSON-RPC layer on top of them.

use shared_types::Node;
use thiserror::Error;

/// Errors from websocket connections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// The handshake with the node failed.
    #[error("Failed to connect to {node}: {reason}")]
    Dial {
        /// Target node
        node: Node,
        /// Transport error
        reason: String,
    },

    /// The handshake did not finish in time.
    #[error("Connecting to {0} timed out")]
    Timeout(Node),

    /// A message was sent before the socket was ready.
    #[error("Websocket to {0} is not connected")]
    NotConnected(Node),

    /// The socket was closed while waiting on it.
    #[error("Websocket to {0} was closed")]
    Closed(Node),

    /// The socket failed while waiting on it.
    #[error("Websocket to {0} failed")]
    Failed(Node),

    /// The connection manager has shut down.
    #[error("Connection manager is shut down")]
    ManagerClosed,
}

/// Errors from JSON-RPC calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// The underlying socket could not carry the request.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// The node answered with an error object.
    #[error("RPC error {code}: {message}")]
    Remote {
        /// JSON-RPC error code
        code: i64,
        /// Error message
        message: String,
    },

    /// The socket went away before the node answered.
    #[error("No response to {0}")]
    NoResponse(String),

    /// A message could not be encoded or decoded.
    #[error("Invalid RPC message: {0}")]
    InvalidMessage(String),
}
