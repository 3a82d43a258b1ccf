//! Mock collaborators with call counters, for tests.

use super::outbound::*;
use async_trait::async_trait;
use futures_util::StreamExt;
use lc_02_atom_model::{AtomIdentifier, SignedAtom};
use lc_04_connection_manager::{
    ConnectionError, ConnectionSettings, MockDialBehavior, MockDialer, WebSocketDialer,
    WebSocketToNode,
};
use parking_lot::Mutex;
use shared_bus::{AtomStatusEvent, SubmitAtomError, SubscriberId};
use shared_types::Node;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Connects real sockets over a [`MockDialer`] and keeps them alive.
pub struct MockWebSocketConnector {
    dialer: Arc<MockDialer>,
    sockets: Mutex<Vec<Arc<WebSocketToNode>>>,
}

impl MockWebSocketConnector {
    /// Connector whose dials succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_behavior(MockDialBehavior::Accept)
    }

    /// Connector whose dials behave as `behavior`.
    #[must_use]
    pub fn with_behavior(behavior: MockDialBehavior) -> Self {
        Self {
            dialer: Arc::new(MockDialer::with_behavior(behavior)),
            sockets: Mutex::new(Vec::new()),
        }
    }

    /// Nodes connected so far, in order.
    #[must_use]
    pub fn connected_nodes(&self) -> Vec<Node> {
        self.sockets.lock().iter().map(|s| s.node().clone()).collect()
    }

    /// Number of connect calls.
    #[must_use]
    pub fn connect_count(&self) -> usize {
        self.dialer.dial_count()
    }
}

impl Default for MockWebSocketConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebSocketConnecting for MockWebSocketConnector {
    async fn connect(&self, node: &Node) -> Result<Arc<WebSocketToNode>, ConnectionError> {
        let socket = Arc::new(WebSocketToNode::new(
            node.clone(),
            Arc::clone(&self.dialer) as Arc<dyn WebSocketDialer>,
            ConnectionSettings::default(),
        ));
        socket.connect_and_notify_when_connected().await?;
        self.sockets.lock().push(Arc::clone(&socket));
        Ok(socket)
    }
}

/// Records which sockets were released.
#[derive(Default)]
pub struct MockWebSocketCloser {
    closed: Mutex<Vec<Node>>,
}

impl MockWebSocketCloser {
    /// New closer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes closed so far, in order.
    #[must_use]
    pub fn closed_nodes(&self) -> Vec<Node> {
        self.closed.lock().clone()
    }

    /// Number of close calls.
    #[must_use]
    pub fn close_count(&self) -> usize {
        self.closed.lock().len()
    }
}

impl WebSocketClosing for MockWebSocketCloser {
    fn close_web_socket_to(&self, node: &Node) {
        self.closed.lock().push(node.clone());
    }
}

/// Status feed driven by the test. Events sent before the epic observes are
/// buffered.
pub struct MockAtomStatusObserver {
    feed: mpsc::UnboundedSender<AtomStatusEvent>,
    events: Mutex<Option<mpsc::UnboundedReceiver<AtomStatusEvent>>>,
    observe_count: AtomicUsize,
}

impl MockAtomStatusObserver {
    /// New observer with an empty feed.
    #[must_use]
    pub fn new() -> Self {
        let (feed, events) = mpsc::unbounded_channel();
        Self {
            feed,
            events: Mutex::new(Some(events)),
            observe_count: AtomicUsize::new(0),
        }
    }

    /// Push a status event.
    pub fn send(&self, event: AtomStatusEvent) {
        let _ = self.feed.send(event);
    }

    /// Number of observe calls.
    #[must_use]
    pub fn observe_count(&self) -> usize {
        self.observe_count.load(Ordering::SeqCst)
    }
}

impl Default for MockAtomStatusObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomStatusObserving for MockAtomStatusObserver {
    fn observe_atom_status_notifications(
        &self,
        _subscriber_id: &SubscriberId,
    ) -> AtomStatusEventStream {
        self.observe_count.fetch_add(1, Ordering::SeqCst);
        match self.events.lock().take() {
            Some(events) => UnboundedReceiverStream::new(events).boxed(),
            None => futures_util::stream::pending::<AtomStatusEvent>().boxed(),
        }
    }
}

/// Counts subscription requests.
#[derive(Default)]
pub struct MockObservationRequester {
    calls: AtomicUsize,
    failure: Mutex<Option<SubmitAtomError>>,
}

impl MockObservationRequester {
    /// Requester that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requester that fails with `error`.
    #[must_use]
    pub fn failing(error: SubmitAtomError) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failure: Mutex::new(Some(error)),
        }
    }

    /// Number of requests.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AtomStatusObservationRequesting for MockObservationRequester {
    async fn send_get_atom_status_notifications(
        &self,
        _atom_id: &AtomIdentifier,
        _subscriber_id: &SubscriberId,
    ) -> Result<(), SubmitAtomError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Counts pushes. By default a push never resolves, as a node that only
/// answers through status notifications.
#[derive(Default)]
pub struct MockAtomSubmitter {
    calls: AtomicUsize,
    outcome: Mutex<Option<Result<(), SubmitAtomError>>>,
}

impl MockAtomSubmitter {
    /// Submitter whose pushes never resolve.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Submitter whose pushes resolve with `outcome`.
    #[must_use]
    pub fn resolving(outcome: Result<(), SubmitAtomError>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            outcome: Mutex::new(Some(outcome)),
        }
    }

    /// Number of pushes.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AtomSubmitting for MockAtomSubmitter {
    async fn push_atom(&self, _atom: &SignedAtom) -> Result<(), SubmitAtomError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.outcome.lock().clone();
        match outcome {
            Some(outcome) => outcome,
            None => std::future::pending().await,
        }
    }
}

/// Counts cancellations.
#[derive(Default)]
pub struct MockObservationCanceller {
    calls: AtomicUsize,
}

impl MockObservationCanceller {
    /// New canceller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cancellations.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AtomStatusObservationCancelling for MockObservationCanceller {
    async fn close_atom_status_notifications(
        &self,
        _subscriber_id: &SubscriberId,
    ) -> Result<(), SubmitAtomError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out the same mocks for every socket.
pub struct MockSubmissionClientFactory {
    /// Status feed.
    pub observer: Arc<MockAtomStatusObserver>,
    /// Subscription requests.
    pub requester: Arc<MockObservationRequester>,
    /// Pushes.
    pub submitter: Arc<MockAtomSubmitter>,
    /// Cancellations.
    pub canceller: Arc<MockObservationCanceller>,
    sockets: Mutex<Vec<Node>>,
}

impl MockSubmissionClientFactory {
    /// Factory over fresh default mocks.
    #[must_use]
    pub fn new() -> Self {
        Self::with_submitter(MockAtomSubmitter::new())
    }

    /// Factory over default mocks and `submitter`.
    #[must_use]
    pub fn with_submitter(submitter: MockAtomSubmitter) -> Self {
        Self {
            observer: Arc::new(MockAtomStatusObserver::new()),
            requester: Arc::new(MockObservationRequester::new()),
            submitter: Arc::new(submitter),
            canceller: Arc::new(MockObservationCanceller::new()),
            sockets: Mutex::new(Vec::new()),
        }
    }

    /// Nodes clients were built for.
    #[must_use]
    pub fn client_nodes(&self) -> Vec<Node> {
        self.sockets.lock().clone()
    }
}

impl Default for MockSubmissionClientFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionClientFactory for MockSubmissionClientFactory {
    fn clients_for(&self, socket: Arc<WebSocketToNode>) -> SubmissionClients {
        self.sockets.lock().push(socket.node().clone());
        SubmissionClients {
            observer: Arc::clone(&self.observer) as Arc<dyn AtomStatusObserving>,
            requester: Arc::clone(&self.requester) as Arc<dyn AtomStatusObservationRequesting>,
            submitter: Arc::clone(&self.submitter) as Arc<dyn AtomSubmitting>,
            canceller: Arc::clone(&self.canceller) as Arc<dyn AtomStatusObservationCancelling>,
        }
    }
}
