//! # Ledger Client Runtime
//!
//! Configuration and wiring for the ledger client. The `client-runtime`
//! binary is a thin shell around [`ClientRuntime`].
//!
//! ## Architecture
//!
//! ```text
//!   ClientConfig ──► ClientRuntime
//!                        │
//!                        ├── NodeActionStore ◄──── epics ────┐
//!                        │        │                          │
//!                        │        ├── ConnectWebSocketEpic ──┤
//!                        │        ├── FindANodeEpic ─────────┤
//!                        │        └── SubmitAtomEpic ────────┘
//!                        │
//!                        └── WebSocketsManager (one socket per node)
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! client-runtime/
//! ├── config.rs   # ClientConfig, defaults, file and env loading
//! ├── runtime.rs  # ClientRuntime wiring and shutdown
//! └── main.rs     # Logging and Ctrl+C handling
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod runtime;

// Re-exports
pub use config::{
    ClientConfig, ConfigError, StoreConfig, SubmissionConfig, UniverseConfig, WebSocketConfig,
};
pub use runtime::ClientRuntime;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
