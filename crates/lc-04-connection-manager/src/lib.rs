//! # Connection Manager (LC-04)
//!
//! Owns the websockets to ledger nodes. There is at most one socket per
//! node; every component that talks to a node registers a listener on that
//! socket, and an idle socket is only closed once no listener remains.
//!
//! ## Architecture
//!
//! ```text
//!  NodeAction::ConnectWebSocket ──► ConnectWebSocketEpic ──► WebSocketsManager
//!  NodeAction::CloseWebSocket   ──►        │                    │
//!                                          ▼                    ▼
//!                                   WebSocketCloser       WebSocketToNode ◄── JsonRpcClient
//!                                                               │
//!                                                         WebSocketDialer (port)
//!                                                               │
//!                                                      TungsteniteDialer (adapter)
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! lc-04-connection-manager/
//! ├── domain/     # Close strategies, settings, errors
//! ├── ports/      # WebSocketDialer, mocks behind `test-utils`
//! ├── adapters/   # tokio-tungstenite transport
//! ├── service/    # WebSocketToNode, WebSocketsManager, WebSocketCloser
//! ├── epics/      # ConnectWebSocketEpic
//! └── rpc/        # JSON-RPC messages and client
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod domain;
pub mod epics;
pub mod ports;
pub mod rpc;
pub mod service;

// Re-exports
pub use adapters::TungsteniteDialer;
pub use domain::{
    CloseResult, CloseStrategy, ConnectionError, ConnectionSettings, NotClosedReason, RpcError,
    DEFAULT_CLOSE_DELAY, DEFAULT_CONNECT_TIMEOUT, DEFAULT_FAILED_DEBOUNCE,
};
pub use epics::ConnectWebSocketEpic;
pub use ports::{LinkEvent, WebSocketDialer, WebSocketLink};
pub use rpc::{methods, AtomStatusNotification, AtomStatusNotifications, JsonRpcClient, RpcRequest};
pub use service::{Listener, StatusUpdate, WebSocketCloser, WebSocketToNode, WebSocketsManager};
pub use shared_bus::AtomStatus;

#[cfg(any(test, feature = "test-utils"))]
pub use ports::{MockDialBehavior, MockDialer, MockRemote};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
