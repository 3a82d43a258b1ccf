//! Epics driving the connection manager from the action store.

pub mod connect;

pub use connect::ConnectWebSocketEpic;
