//! Cross-crate flows: runtime, epics, connection manager and JSON-RPC.

#[cfg(test)]
mod support;

mod connection_flow;
mod submission_flow;
mod transfer_flow;
