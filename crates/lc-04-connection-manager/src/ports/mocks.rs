//! Mock dialer whose remote ends are driven by the test.

use crate::domain::ConnectionError;
use crate::ports::outbound::{LinkEvent, WebSocketDialer, WebSocketLink};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::Node;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// How [`MockDialer`] answers a dial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockDialBehavior {
    /// Hand out a link and publish its remote end.
    #[default]
    Accept,
    /// Fail the handshake.
    Refuse,
    /// Never finish the handshake.
    Hang,
}

/// Dialer that counts dials and exposes each remote end.
pub struct MockDialer {
    behavior: Mutex<MockDialBehavior>,
    dial_count: AtomicUsize,
    remotes_tx: mpsc::UnboundedSender<MockRemote>,
    remotes_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<MockRemote>>,
}

impl MockDialer {
    /// Dialer that accepts every dial.
    #[must_use]
    pub fn new() -> Self {
        Self::with_behavior(MockDialBehavior::Accept)
    }

    /// Dialer with a fixed behavior.
    #[must_use]
    pub fn with_behavior(behavior: MockDialBehavior) -> Self {
        let (remotes_tx, remotes_rx) = mpsc::unbounded_channel();
        Self {
            behavior: Mutex::new(behavior),
            dial_count: AtomicUsize::new(0),
            remotes_tx,
            remotes_rx: tokio::sync::Mutex::new(remotes_rx),
        }
    }

    /// Change how later dials are answered.
    pub fn set_behavior(&self, behavior: MockDialBehavior) {
        *self.behavior.lock() = behavior;
    }

    /// Number of dials so far.
    #[must_use]
    pub fn dial_count(&self) -> usize {
        self.dial_count.load(Ordering::SeqCst)
    }

    /// Remote end of the next accepted dial.
    pub async fn next_remote(&self) -> Option<MockRemote> {
        self.remotes_rx.lock().await.recv().await
    }
}

impl Default for MockDialer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebSocketDialer for MockDialer {
    async fn dial(&self, node: &Node) -> Result<WebSocketLink, ConnectionError> {
        self.dial_count.fetch_add(1, Ordering::SeqCst);
        let behavior = *self.behavior.lock();
        match behavior {
            MockDialBehavior::Refuse => Err(ConnectionError::Dial {
                node: node.clone(),
                reason: "refused".into(),
            }),
            MockDialBehavior::Hang => std::future::pending().await,
            MockDialBehavior::Accept => {
                let (outgoing, sent) = mpsc::unbounded_channel();
                let (events, incoming) = mpsc::unbounded_channel();
                let _ = self.remotes_tx.send(MockRemote {
                    node: node.clone(),
                    sent,
                    events,
                });
                Ok(WebSocketLink { outgoing, incoming })
            }
        }
    }
}

/// The node side of a mock link.
pub struct MockRemote {
    node: Node,
    sent: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<LinkEvent>,
}

impl MockRemote {
    /// Node this link was dialed for.
    #[must_use]
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Push a text frame to the client.
    pub fn push_text(&self, text: impl Into<String>) -> bool {
        self.events.send(LinkEvent::Text(text.into())).is_ok()
    }

    /// Close the link cleanly.
    pub fn close(&self) {
        let _ = self.events.send(LinkEvent::Closed);
    }

    /// Break the link.
    pub fn fail(&self, reason: &str) {
        let _ = self.events.send(LinkEvent::Failed(reason.to_owned()));
    }

    /// Next frame the client wrote, `None` once the client closed.
    pub async fn next_sent(&mut self) -> Option<String> {
        self.sent.recv().await
    }

    /// Next frame the client wrote, if already queued.
    pub fn try_next_sent(&mut self) -> Option<String> {
        self.sent.try_recv().ok()
    }
}
