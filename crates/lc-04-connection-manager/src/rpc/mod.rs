//! JSON-RPC 2.0 over a node websocket.

pub mod client;
pub mod messages;

pub use client::{AtomStatusNotifications, JsonRpcClient};
pub use messages::{methods, AtomStatusNotification, IncomingMessage, RpcRequest, JSONRPC_VERSION};
