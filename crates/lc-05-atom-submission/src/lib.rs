//! # Atom Submission (LC-05)
//!
//! Gets a signed atom to a node and reports what became of it.
//!
//! **Architecture:** epics on the node action store, network reached through
//! ports implemented over the connection manager
//!
//! ## Submission Flow
//!
//! ```text
//! TransactionMaker ──Request──► SubmitAtomEpic ──FindANodeRequest──► FindANodeEpic
//!        ▲                           │   ▲                                │
//!        │                           │   └────────FindANodeResult─────────┘
//!        │                           ▼
//!        │               connect ─► observe ─► request status ─► push
//!        │                           │
//!        └──── Status* / Completed ◄─┘
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! lc-05-atom-submission/
//! ├── domain/     # ResultOfUserAction, staging errors
//! ├── ports/      # Collaborator traits, mocks behind `test-utils`
//! ├── adapters/   # JSON-RPC client and socket manager as ports
//! ├── epics/      # SubmitAtomEpic, FindANodeEpic, ApplyStoredAtomsEpic
//! └── service/    # TransactionMaker, InMemoryLedgerState
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod domain;
pub mod epics;
pub mod ports;
pub mod service;

#[cfg(test)]
mod test_fixtures;

// Re-exports
pub use adapters::JsonRpcClientFactory;
pub use domain::{
    FailedToStageAction, PendingSubmission, ResultOfUserAction, StageError, UserActionError,
};
pub use epics::{
    ApplyStoredAtomsEpic, FindANodeEpic, SubmitAtomEpic, DEFAULT_SUBMISSION_TIMEOUT,
};
pub use ports::{
    AtomStatusEventStream, AtomStatusObservationCancelling, AtomStatusObservationRequesting,
    AtomStatusObserving, AtomSubmitting, LedgerState, SubmissionClientFactory, SubmissionClients,
    WebSocketClosing, WebSocketConnecting,
};
pub use service::{InMemoryLedgerState, TransactionMaker};

#[cfg(any(test, feature = "test-utils"))]
pub use ports::{
    MockAtomStatusObserver, MockAtomSubmitter, MockObservationCanceller,
    MockObservationRequester, MockSubmissionClientFactory, MockWebSocketCloser,
    MockWebSocketConnector,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
