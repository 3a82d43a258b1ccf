//! # WebSocket To Node
//!
//! The one logical connection to a node. Status changes happen under the
//! socket's lock, so updates for one node are serialized.
//!
//! ```text
//! Disconnected ──connect──► Connecting ──dial ok──► Connected
//!      ▲                        │                      │
//!      │                   dial error               link error
//!      │                        ▼                      ▼
//!      └──── debounce ────── Failed ◄──────────────────┘
//!
//! Connecting | Connected ──close──► Closing ──► Disconnected
//! ```

use crate::domain::{CloseResult, CloseStrategy, ConnectionError, ConnectionSettings, NotClosedReason};
use crate::ports::{LinkEvent, WebSocketDialer, WebSocketLink};
use parking_lot::Mutex;
use shared_types::{Node, WebSocketStatus};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Key of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ListenerId(u64);

#[derive(Default)]
struct SocketState {
    outgoing: Option<mpsc::UnboundedSender<String>>,
    close_signal: Option<oneshot::Sender<()>>,
    listeners: HashMap<ListenerId, mpsc::UnboundedSender<String>>,
    next_listener_id: u64,
    debounce: Option<JoinHandle<()>>,
}

struct Shared {
    node: Node,
    dialer: Arc<dyn WebSocketDialer>,
    settings: ConnectionSettings,
    status: watch::Sender<WebSocketStatus>,
    state: Mutex<SocketState>,
}

impl Shared {
    fn status(&self) -> WebSocketStatus {
        *self.status.borrow()
    }

    /// Enter `status`. Leaving `Failed` cancels its debounce timer; entering
    /// it starts one.
    fn transition(self: &Arc<Self>, state: &mut SocketState, status: WebSocketStatus) {
        if let Some(debounce) = state.debounce.take() {
            debounce.abort();
        }
        let previous = self.status.send_replace(status);
        if previous != status {
            debug!(node = %self.node, from = %previous, to = %status, "Websocket status changed");
        }
        if status == WebSocketStatus::Failed {
            state.debounce = Some(self.start_debounce());
        }
    }

    fn start_debounce(self: &Arc<Self>) -> JoinHandle<()> {
        let shared = Arc::downgrade(self);
        let delay = self.settings.failed_debounce;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let mut state = shared.state.lock();
            if shared.status() == WebSocketStatus::Failed {
                // Detach ourselves so the transition does not abort this task.
                state.debounce.take();
                shared.transition(&mut state, WebSocketStatus::Disconnected);
            }
        })
    }

    fn release_link(state: &mut SocketState) {
        state.outgoing = None;
        state.close_signal = None;
    }

    /// Returns false if a close raced the handshake; the link is dropped.
    fn on_connected(self: &Arc<Self>, outgoing: mpsc::UnboundedSender<String>) -> bool {
        let mut state = self.state.lock();
        if self.status() != WebSocketStatus::Connecting {
            Self::release_link(&mut state);
            self.transition(&mut state, WebSocketStatus::Disconnected);
            return false;
        }
        state.outgoing = Some(outgoing);
        self.transition(&mut state, WebSocketStatus::Connected);
        info!(node = %self.node, "Websocket connected");
        true
    }

    fn on_dial_failed(self: &Arc<Self>, error: &ConnectionError) {
        let mut state = self.state.lock();
        Self::release_link(&mut state);
        if self.status() == WebSocketStatus::Closing {
            self.transition(&mut state, WebSocketStatus::Disconnected);
            return;
        }
        warn!(node = %self.node, error = %error, "Websocket connection failed");
        self.transition(&mut state, WebSocketStatus::Failed);
    }

    fn on_link_ended(self: &Arc<Self>, failure: Option<String>) {
        let mut state = self.state.lock();
        Self::release_link(&mut state);
        let next = match (self.status(), failure) {
            (WebSocketStatus::Closing, _) => WebSocketStatus::Disconnected,
            (_, Some(reason)) => {
                warn!(node = %self.node, reason = %reason, "Websocket failed");
                WebSocketStatus::Failed
            }
            (_, None) => {
                debug!(node = %self.node, "Websocket closed by node");
                WebSocketStatus::Disconnected
            }
        };
        self.transition(&mut state, next);
    }

    fn on_closed(self: &Arc<Self>) {
        let mut state = self.state.lock();
        Self::release_link(&mut state);
        self.transition(&mut state, WebSocketStatus::Disconnected);
        debug!(node = %self.node, "Websocket closed");
    }

    fn close_locked(self: &Arc<Self>, state: &mut SocketState) {
        match self.status() {
            WebSocketStatus::Connecting | WebSocketStatus::Connected => {
                state.outgoing = None;
                match state.close_signal.take() {
                    Some(signal) => {
                        self.transition(state, WebSocketStatus::Closing);
                        let _ = signal.send(());
                    }
                    None => self.transition(state, WebSocketStatus::Disconnected),
                }
            }
            WebSocketStatus::Failed => self.transition(state, WebSocketStatus::Disconnected),
            WebSocketStatus::Closing | WebSocketStatus::Disconnected => {}
        }
    }

    fn fan_out(&self, text: &str) {
        let mut state = self.state.lock();
        state
            .listeners
            .retain(|_, listener| listener.send(text.to_owned()).is_ok());
    }
}

async fn run_session(shared: Arc<Shared>, mut close_rx: oneshot::Receiver<()>) {
    let dial = tokio::time::timeout(
        shared.settings.connect_timeout,
        shared.dialer.dial(&shared.node),
    );
    let dialed = tokio::select! {
        result = dial => result,
        _ = &mut close_rx => {
            shared.on_closed();
            return;
        }
    };

    let WebSocketLink {
        outgoing,
        mut incoming,
    } = match dialed {
        Ok(Ok(link)) => link,
        Ok(Err(e)) => return shared.on_dial_failed(&e),
        Err(_) => return shared.on_dial_failed(&ConnectionError::Timeout(shared.node.clone())),
    };
    if !shared.on_connected(outgoing) {
        return;
    }

    loop {
        tokio::select! {
            event = incoming.recv() => match event {
                Some(LinkEvent::Text(text)) => shared.fan_out(&text),
                Some(LinkEvent::Failed(reason)) => return shared.on_link_ended(Some(reason)),
                Some(LinkEvent::Closed) | None => return shared.on_link_ended(None),
            },
            _ = &mut close_rx => return shared.on_closed(),
        }
    }
}

/// Persistent duplex connection to one node, shared by its listeners.
///
/// Dropping the last handle closes the socket.
pub struct WebSocketToNode {
    shared: Arc<Shared>,
}

impl WebSocketToNode {
    /// A closed socket to `node`.
    #[must_use]
    pub fn new(node: Node, dialer: Arc<dyn WebSocketDialer>, settings: ConnectionSettings) -> Self {
        let (status, _) = watch::channel(WebSocketStatus::Disconnected);
        Self {
            shared: Arc::new(Shared {
                node,
                dialer,
                settings,
                status,
                state: Mutex::new(SocketState::default()),
            }),
        }
    }

    /// Node this socket talks to.
    #[must_use]
    pub fn node(&self) -> &Node {
        &self.shared.node
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> WebSocketStatus {
        self.shared.status()
    }

    /// Receiver of status changes, starting at the current status.
    #[must_use]
    pub fn status_changes(&self) -> watch::Receiver<WebSocketStatus> {
        self.shared.status.subscribe()
    }

    /// Start connecting unless already connecting, connected or closing.
    pub fn connect(&self) {
        let shared = &self.shared;
        let mut state = shared.state.lock();
        if !shared.status().can_connect() {
            return;
        }
        let (close_tx, close_rx) = oneshot::channel();
        state.close_signal = Some(close_tx);
        shared.transition(&mut state, WebSocketStatus::Connecting);
        tokio::spawn(run_session(Arc::clone(shared), close_rx));
    }

    /// Connect and wait until the socket is ready.
    pub async fn connect_and_notify_when_connected(&self) -> Result<(), ConnectionError> {
        let mut status = self.status_changes();
        self.connect();
        loop {
            let current = *status.borrow_and_update();
            match current {
                WebSocketStatus::Connected => return Ok(()),
                WebSocketStatus::Failed => return Err(ConnectionError::Failed(self.node().clone())),
                WebSocketStatus::Disconnected => {
                    return Err(ConnectionError::Closed(self.node().clone()))
                }
                WebSocketStatus::Connecting | WebSocketStatus::Closing => {}
            }
            status
                .changed()
                .await
                .map_err(|_| ConnectionError::Closed(self.node().clone()))?;
        }
    }

    /// Close according to `strategy`.
    pub fn close(&self, strategy: CloseStrategy) -> CloseResult {
        let shared = &self.shared;
        let mut state = shared.state.lock();
        if strategy == CloseStrategy::SkipIfInUse && !state.listeners.is_empty() {
            debug!(
                node = %shared.node,
                listeners = state.listeners.len(),
                "Websocket in use, not closing"
            );
            return CloseResult::DidNotClose(NotClosedReason::InUse);
        }
        shared.close_locked(&mut state);
        CloseResult::Closed
    }

    /// Close even if listeners are registered.
    pub fn close_disregarding_listeners(&self) {
        let shared = &self.shared;
        let mut state = shared.state.lock();
        shared.close_locked(&mut state);
    }

    /// Write a text frame.
    pub fn send_message(&self, message: impl Into<String>) -> Result<(), ConnectionError> {
        let state = self.shared.state.lock();
        match &state.outgoing {
            Some(outgoing) if self.shared.status().is_ready() => outgoing
                .send(message.into())
                .map_err(|_| ConnectionError::Closed(self.node().clone())),
            _ => Err(ConnectionError::NotConnected(self.node().clone())),
        }
    }

    /// Register for every text frame from the node. Dropping the returned
    /// listener deregisters it.
    #[must_use]
    pub fn add_listener(&self) -> Listener {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.shared.state.lock();
        let id = ListenerId(state.next_listener_id);
        state.next_listener_id += 1;
        state.listeners.insert(id, tx);
        Listener {
            id,
            socket: Arc::downgrade(&self.shared),
            messages: rx,
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.shared.state.lock().listeners.len()
    }
}

impl Drop for WebSocketToNode {
    fn drop(&mut self) {
        self.close_disregarding_listeners();
    }
}

impl std::fmt::Debug for WebSocketToNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketToNode")
            .field("node", &self.shared.node)
            .field("status", &self.status())
            .finish()
    }
}

/// Registration for frames from one socket.
pub struct Listener {
    id: ListenerId,
    socket: Weak<Shared>,
    messages: mpsc::UnboundedReceiver<String>,
}

impl Listener {
    /// Next frame. Returns `None` once the socket is gone.
    pub async fn recv(&mut self) -> Option<String> {
        self.messages.recv().await
    }

    /// Deregister.
    pub fn remove(self) {}
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Some(socket) = self.socket.upgrade() {
            socket.state.lock().listeners.remove(&self.id);
        }
    }
}
