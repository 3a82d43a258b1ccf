//! # Client Runtime
//!
//! Owns the node action store and the connection manager, and registers the
//! epics that connect them.
//!
//! ## Startup Sequence
//!
//! 1. Create the store with the configured channel capacity
//! 2. Create the connection manager and the delayed closer
//! 3. Register the connect, find-a-node and submit epics, plus the one that
//!    applies stored atoms to the ledger view
//! 4. Dispatch `ConnectWebSocket` for every configured node
//! 5. Log network state changes until shutdown

use crate::config::ClientConfig;
use lc_04_connection_manager::{
    ConnectWebSocketEpic, TungsteniteDialer, WebSocketCloser, WebSocketDialer, WebSocketsManager,
};
use lc_05_atom_submission::{
    ApplyStoredAtomsEpic, FindANodeEpic, InMemoryLedgerState, JsonRpcClientFactory, SubmitAtomEpic,
};
use shared_bus::{NodeAction, NodeActionStore, StoreError};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// The running client.
pub struct ClientRuntime {
    config: ClientConfig,
    store: Arc<NodeActionStore>,
    manager: WebSocketsManager,
    ledger: Arc<InMemoryLedgerState>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl ClientRuntime {
    /// Runtime dialing real websockets. Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self::with_dialer(config, Arc::new(TungsteniteDialer))
    }

    /// Runtime dialing through `dialer`.
    #[must_use]
    pub fn with_dialer(config: ClientConfig, dialer: Arc<dyn WebSocketDialer>) -> Self {
        info!(
            magic = config.universe.magic.0,
            nodes = config.nodes.len(),
            "Creating ledger client runtime"
        );
        let store = Arc::new(NodeActionStore::with_capacity(
            config.store.channel_capacity,
        ));
        let manager = WebSocketsManager::new(dialer, config.to_connection_settings());
        let closer = WebSocketCloser::new(manager.clone(), config.websocket.close_delay);

        store.register_epic(Arc::new(ConnectWebSocketEpic::new(
            manager.clone(),
            closer.clone(),
        )));
        store.register_epic(Arc::new(FindANodeEpic::new(config.nodes.clone())));
        store.register_epic(Arc::new(
            SubmitAtomEpic::new(
                Arc::new(manager.clone()),
                Arc::new(closer),
                Arc::new(JsonRpcClientFactory),
            )
            .with_timeout(config.submission.timeout),
        ));
        let ledger = Arc::new(InMemoryLedgerState::new());
        store.register_epic(Arc::new(ApplyStoredAtomsEpic::new(Arc::clone(&ledger))));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            config,
            store,
            manager,
            ledger,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Connect to every configured node and start logging network state.
    pub fn start(&self) -> Result<JoinHandle<()>, StoreError> {
        for node in &self.config.nodes {
            debug!(node = %node, "Connecting");
            self.store
                .dispatch(NodeAction::ConnectWebSocket { node: node.clone() })?;
        }
        Ok(self.spawn_status_logger())
    }

    fn spawn_status_logger(&self) -> JoinHandle<()> {
        let mut network = self.store.network_state();
        let mut shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = network.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let state = network.borrow_and_update().clone();
                        for (node, status) in state.nodes() {
                            debug!(node = %node, status = %status, "Websocket status");
                        }
                        info!(
                            connected = state.connected_nodes().count(),
                            known = state.len(),
                            "Network state changed"
                        );
                    }
                    _ = shutdown.changed() => break,
                }
            }
        })
    }

    /// Loaded configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The node action store.
    #[must_use]
    pub fn store(&self) -> &Arc<NodeActionStore> {
        &self.store
    }

    /// The connection manager.
    #[must_use]
    pub fn manager(&self) -> &WebSocketsManager {
        &self.manager
    }

    /// Ledger view, updated as submitted atoms are stored.
    #[must_use]
    pub fn ledger(&self) -> &Arc<InMemoryLedgerState> {
        &self.ledger
    }

    /// Stop the epics, then close every socket. Idempotent.
    pub async fn shutdown(&self) {
        if self.shutdown_tx.send_replace(true) {
            return;
        }
        info!("Shutting down ledger client runtime");
        self.store.shutdown().await;
        self.manager.shutdown().await;
    }
}
