//! # WebSockets Manager
//!
//! Registry of sockets, one per node, owned by a single task. Everything
//! else reaches it through the command channel behind [`WebSocketsManager`].

use crate::domain::{CloseResult, CloseStrategy, ConnectionError, ConnectionSettings, NotClosedReason};
use crate::ports::WebSocketDialer;
use crate::service::socket::WebSocketToNode;
use shared_types::{Node, WebSocketStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info};

/// Capacity of the status update broadcast.
const STATUS_CHANNEL_CAPACITY: usize = 256;

/// A status change of one node's socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Node.
    pub node: Node,
    /// New status.
    pub status: WebSocketStatus,
}

enum Command {
    SocketTo {
        node: Node,
        reply: oneshot::Sender<Arc<WebSocketToNode>>,
    },
    TryClose {
        node: Node,
        strategy: CloseStrategy,
        reply: oneshot::Sender<CloseResult>,
    },
    Nodes {
        reply: oneshot::Sender<Vec<Node>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to the socket registry. Cheap to clone.
#[derive(Clone)]
pub struct WebSocketsManager {
    commands: mpsc::UnboundedSender<Command>,
    statuses: broadcast::Sender<StatusUpdate>,
}

impl WebSocketsManager {
    /// Start the registry task. Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(dialer: Arc<dyn WebSocketDialer>, settings: ConnectionSettings) -> Self {
        let (commands, commands_rx) = mpsc::unbounded_channel();
        let (statuses, _) = broadcast::channel(STATUS_CHANNEL_CAPACITY);
        let registry = Registry {
            dialer,
            settings,
            sockets: HashMap::new(),
            statuses: statuses.clone(),
        };
        tokio::spawn(registry.run(commands_rx));
        Self { commands, statuses }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ConnectionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .map_err(|_| ConnectionError::ManagerClosed)?;
        response.await.map_err(|_| ConnectionError::ManagerClosed)
    }

    /// The socket to `node`, created closed if there is none yet.
    pub async fn socket_to(&self, node: &Node) -> Result<Arc<WebSocketToNode>, ConnectionError> {
        let node = node.clone();
        self.request(|reply| Command::SocketTo { node, reply }).await
    }

    /// The socket to `node`, once it is connected.
    pub async fn connect(&self, node: &Node) -> Result<Arc<WebSocketToNode>, ConnectionError> {
        let socket = self.socket_to(node).await?;
        socket.connect_and_notify_when_connected().await?;
        Ok(socket)
    }

    /// Close the socket to `node` according to `strategy`.
    pub async fn try_close_socket_to(
        &self,
        node: &Node,
        strategy: CloseStrategy,
    ) -> Result<CloseResult, ConnectionError> {
        let node = node.clone();
        self.request(|reply| Command::TryClose {
            node,
            strategy,
            reply,
        })
        .await
    }

    /// Nodes with a registered socket.
    pub async fn nodes(&self) -> Result<Vec<Node>, ConnectionError> {
        self.request(|reply| Command::Nodes { reply }).await
    }

    /// Status changes of every socket created from now on.
    #[must_use]
    pub fn status_updates(&self) -> broadcast::Receiver<StatusUpdate> {
        self.statuses.subscribe()
    }

    /// Close every socket and stop the registry. Idempotent.
    pub async fn shutdown(&self) {
        let _ = self.request(|reply| Command::Shutdown { reply }).await;
    }
}

struct Registry {
    dialer: Arc<dyn WebSocketDialer>,
    settings: ConnectionSettings,
    sockets: HashMap<Node, Arc<WebSocketToNode>>,
    statuses: broadcast::Sender<StatusUpdate>,
}

impl Registry {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        debug!("Socket registry started");
        while let Some(command) = commands.recv().await {
            match command {
                Command::SocketTo { node, reply } => {
                    let _ = reply.send(self.socket_to(node));
                }
                Command::TryClose {
                    node,
                    strategy,
                    reply,
                } => {
                    let result = match self.sockets.get(&node) {
                        Some(socket) => socket.close(strategy),
                        None => CloseResult::DidNotClose(NotClosedReason::NoSuchSocket),
                    };
                    debug!(node = %node, ?strategy, result = %result, "Close requested");
                    let _ = reply.send(result);
                }
                Command::Nodes { reply } => {
                    let _ = reply.send(self.sockets.keys().cloned().collect());
                }
                Command::Shutdown { reply } => {
                    info!(sockets = self.sockets.len(), "Closing all websockets");
                    for socket in self.sockets.values() {
                        socket.close_disregarding_listeners();
                    }
                    self.sockets.clear();
                    let _ = reply.send(());
                    break;
                }
            }
        }
        debug!("Socket registry stopped");
    }

    fn socket_to(&mut self, node: Node) -> Arc<WebSocketToNode> {
        if let Some(socket) = self.sockets.get(&node) {
            return Arc::clone(socket);
        }
        let socket = Arc::new(WebSocketToNode::new(
            node.clone(),
            Arc::clone(&self.dialer),
            self.settings,
        ));
        self.forward_statuses(&socket);
        debug!(node = %node, "Created websocket");
        self.sockets.insert(node, Arc::clone(&socket));
        socket
    }

    fn forward_statuses(&self, socket: &WebSocketToNode) {
        let mut changes = socket.status_changes();
        let node = socket.node().clone();
        let statuses = self.statuses.clone();
        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let status = *changes.borrow_and_update();
                let _ = statuses.send(StatusUpdate {
                    node: node.clone(),
                    status,
                });
            }
        });
    }
}
