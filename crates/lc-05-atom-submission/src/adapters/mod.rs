//! Adapters layer: the ports implemented over the connection manager.

pub mod json_rpc;
pub mod network;

pub use json_rpc::JsonRpcClientFactory;
