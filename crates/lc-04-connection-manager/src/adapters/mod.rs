//! Adapters layer: production transport.

pub mod tungstenite;

pub use tungstenite::TungsteniteDialer;
