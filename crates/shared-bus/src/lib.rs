//! # Shared Bus - Node Action Store
//!
//! Message passing backbone of the ledger client. Components never call
//! each other directly: they dispatch [`NodeAction`]s and react to the
//! actions they subscribe to.
//!
//! ## Choreography
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Epic A       │                    │ Epic B       │
//! │              │    dispatch()      │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐           │
//!                  │ Action Store │ ──────────┘
//!                  │  + reducers  │  subscribe()
//!                  └──────────────┘
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! shared-bus/
//! ├── actions.rs        # NodeAction, SubmitAtomAction, ActionFilter
//! ├── status.rs         # AtomStatus, AtomStatusEvent, SubmitAtomError
//! ├── store.rs          # NodeActionStore, Epic, StateReducer
//! ├── network_state.rs  # Per-node websocket status projection
//! └── subscriber.rs     # Subscription, ActionStream
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
#![warn(missing_docs)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod actions;
pub mod network_state;
pub mod status;
pub mod store;
pub mod subscriber;

// Re-export main types
pub use actions::{
    ActionFilter, ActionKind, CompletionPolicy, NodeAction, SubmitAtomAction, SubmitAtomCompleted,
    SubmitAtomRequest, SubmitAtomSend, SubmitAtomStatus,
};
pub use network_state::{NetworkState, NetworkStateReducer};
pub use status::{AtomStatus, AtomStatusEvent, NotStoredReason, SubmitAtomError, SubscriberId};
pub use store::{ActionDispatcher, Epic, EpicContext, NodeActionStore, StateReducer, StoreError};
pub use subscriber::{ActionStream, Subscription, SubscriptionError};

/// Queued actions above which a subscriber is reported as falling behind.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
