//! Service layer: sockets, their registry and delayed closing.

pub mod closer;
pub mod manager;
pub mod socket;

pub use closer::WebSocketCloser;
pub use manager::{StatusUpdate, WebSocketsManager};
pub use socket::{Listener, WebSocketToNode};
