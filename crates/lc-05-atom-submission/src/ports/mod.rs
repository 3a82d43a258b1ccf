//! Ports layer: collaborators of the submission epic and the transaction
//! maker.

pub mod outbound;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use outbound::{
    AtomStatusEventStream, AtomStatusObservationCancelling, AtomStatusObservationRequesting,
    AtomStatusObserving, AtomSubmitting, LedgerState, SubmissionClientFactory, SubmissionClients,
    WebSocketClosing, WebSocketConnecting,
};

#[cfg(any(test, feature = "test-utils"))]
pub use mocks::{
    MockAtomStatusObserver, MockAtomSubmitter, MockObservationCanceller,
    MockObservationRequester, MockSubmissionClientFactory, MockWebSocketCloser,
    MockWebSocketConnector,
};
