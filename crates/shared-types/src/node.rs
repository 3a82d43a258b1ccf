//! # Nodes
//!
//! A remote ledger node reachable over a websocket, and the lifecycle states
//! of that websocket.

use crate::errors::NodeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Remote node endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Node {
    host: String,
    port: u16,
    #[serde(default)]
    use_ssl: bool,
}

impl Node {
    /// Validate a bare host (no scheme, path or port) and build the endpoint.
    pub fn new(host: impl Into<String>, port: u16, use_ssl: bool) -> Result<Self, NodeError> {
        let host = host.into();
        if host.is_empty() || host.contains([':', '/', ' ']) {
            return Err(NodeError::NonHostStringPassed(host));
        }
        if use_ssl && is_loopback(&host) {
            return Err(NodeError::SslIsUnsupportedForLocalhost);
        }
        Ok(Self {
            host,
            port,
            use_ssl,
        })
    }

    /// Plain text node on localhost, as used by development networks.
    pub fn localhost(port: u16) -> Self {
        Self {
            host: "localhost".to_string(),
            port,
            use_ssl: false,
        }
    }

    /// Host name.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Whether TLS is used.
    #[must_use]
    pub const fn use_ssl(&self) -> bool {
        self.use_ssl
    }

    /// `ws[s]://host:port/rpc`
    #[must_use]
    pub fn websocket_url(&self) -> String {
        let scheme = if self.use_ssl { "wss" } else { "ws" };
        format!("{scheme}://{}:{}/rpc", self.host, self.port)
    }
}

fn is_loopback(host: &str) -> bool {
    host == "localhost" || host.starts_with("127")
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for Node {
    type Err = NodeError;

    /// Parses `host:port`, or `wss://host:port` for TLS.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (use_ssl, rest) = match s.split_once("://") {
            Some(("wss", rest)) => (true, rest),
            Some(("ws", rest)) => (false, rest),
            Some(_) => return Err(NodeError::NonHostStringPassed(s.to_string())),
            None => (false, s),
        };
        let rest = rest.trim_end_matches("/rpc");
        let (host, port) = rest
            .rsplit_once(':')
            .ok_or_else(|| NodeError::NonHostStringPassed(s.to_string()))?;
        let port = port
            .parse()
            .map_err(|_| NodeError::NonHostStringPassed(s.to_string()))?;
        Self::new(host, port, use_ssl)
    }
}

/// Lifecycle of a websocket to one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WebSocketStatus {
    /// No connection.
    #[default]
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Ready for traffic.
    Connected,
    /// Close requested.
    Closing,
    /// Last attempt failed; reverts to `Disconnected` after a debounce.
    Failed,
}

impl WebSocketStatus {
    /// Whether messages can be sent.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Whether a new connection attempt may start from this state.
    #[must_use]
    pub const fn can_connect(&self) -> bool {
        matches!(self, Self::Disconnected | Self::Failed)
    }
}

impl fmt::Display for WebSocketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Closing => "closing",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_websocket_url() {
        let node = Node::new("sunstone.radixdlt.com", 443, true).unwrap();
        assert_eq!(node.websocket_url(), "wss://sunstone.radixdlt.com:443/rpc");
        assert_eq!(Node::localhost(8080).websocket_url(), "ws://localhost:8080/rpc");
    }

    #[test]
    fn test_ssl_refused_for_loopback() {
        assert_eq!(
            Node::new("localhost", 443, true),
            Err(NodeError::SslIsUnsupportedForLocalhost)
        );
        assert_eq!(
            Node::new("127.0.0.1", 443, true),
            Err(NodeError::SslIsUnsupportedForLocalhost)
        );
    }

    #[test]
    fn test_rejects_url_as_host() {
        assert!(matches!(
            Node::new("http://example.com", 80, false),
            Err(NodeError::NonHostStringPassed(_))
        ));
    }

    #[test]
    fn test_parse() {
        let node: Node = "localhost:8080".parse().unwrap();
        assert_eq!(node, Node::localhost(8080));

        let node: Node = "wss://node.example.org:443/rpc".parse().unwrap();
        assert!(node.use_ssl());
        assert_eq!(node.host(), "node.example.org");
    }

    #[test]
    fn test_json_form() {
        let node: Node =
            serde_json::from_str(r#"{"host":"localhost","port":8080}"#).unwrap();
        assert_eq!(node, Node::localhost(8080));
    }

    #[test]
    fn test_status_predicates() {
        assert!(WebSocketStatus::Connected.is_ready());
        assert!(!WebSocketStatus::Connecting.is_ready());
        assert!(WebSocketStatus::Failed.can_connect());
        assert!(!WebSocketStatus::Closing.can_connect());
    }
}
