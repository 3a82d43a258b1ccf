//! # Node Action Store
//!
//! One dispatcher task owns the inbound queue. For every action it runs the
//! registered reducers, then appends the action to the queue of every
//! matching subscriber. Queues are unbounded: every epic and subscriber sees
//! every matching action in dispatch order. Epics run as their own tasks,
//! each with a subscription taken before it starts, and feed their output
//! back through an [`ActionDispatcher`].
//!
//! ```text
//!   dispatch() ──► inbound queue ──► dispatcher task ──► reducers (watch)
//!        ▲                                 │
//!        │                                 ▼
//!        └──────────── epics ◄──── per-subscriber queues
//! ```

use crate::actions::{ActionFilter, NodeAction};
use crate::network_state::{NetworkState, NetworkStateReducer};
use crate::subscriber::{subscription_channel, SubscriberQueue, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Errors from the action store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store has shut down.
    #[error("Action store is shut down")]
    Closed,
}

/// Folds actions into a read-only projection.
pub trait StateReducer: Send + 'static {
    /// Projection type.
    type State: Clone + Send + Sync + 'static;

    /// State before any action.
    fn initial_state(&self) -> Self::State;

    /// Apply one action. Returns whether the state changed.
    fn reduce(&self, state: &mut Self::State, action: &NodeAction) -> bool;
}

/// A long running transformation of the action stream.
///
/// `run` must not hold up its subscription with slow work: spawn it and
/// dispatch the result as a new action.
#[async_trait]
pub trait Epic: Send + Sync + 'static {
    /// Name for logging.
    fn name(&self) -> &'static str;

    /// Actions the epic wants to see.
    fn filter(&self) -> ActionFilter {
        ActionFilter::all()
    }

    /// Consume actions until the subscription ends.
    async fn run(self: Arc<Self>, actions: Subscription, ctx: EpicContext);
}

/// Cloneable handle for injecting actions.
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    sender: mpsc::UnboundedSender<NodeAction>,
    dispatched: Arc<AtomicU64>,
}

impl ActionDispatcher {
    /// Queue an action for dispatch.
    pub fn dispatch(&self, action: impl Into<NodeAction>) -> Result<(), StoreError> {
        self.sender
            .send(action.into())
            .map_err(|_| StoreError::Closed)?;
        self.dispatched.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// What an epic gets besides its subscription.
#[derive(Debug, Clone)]
pub struct EpicContext {
    dispatcher: ActionDispatcher,
    network_state: watch::Receiver<NetworkState>,
}

impl EpicContext {
    /// Queue an output action.
    pub fn dispatch(&self, action: impl Into<NodeAction>) -> Result<(), StoreError> {
        self.dispatcher.dispatch(action)
    }

    /// Dispatch handle to move into spawned work.
    #[must_use]
    pub fn dispatcher(&self) -> ActionDispatcher {
        self.dispatcher.clone()
    }

    /// Current network state.
    #[must_use]
    pub fn network_state(&self) -> NetworkState {
        self.network_state.borrow().clone()
    }

    /// Receiver for network state changes.
    #[must_use]
    pub fn network_state_changes(&self) -> watch::Receiver<NetworkState> {
        self.network_state.clone()
    }
}

type ReducerFn = Box<dyn FnMut(&NodeAction) + Send>;

/// `None` once the dispatcher has stopped.
type Subscribers = Arc<Mutex<Option<Vec<SubscriberQueue>>>>;

/// Store of [`NodeAction`]s with reducers and epics.
///
/// Must be created inside a tokio runtime.
pub struct NodeActionStore {
    dispatcher: ActionDispatcher,
    subscribers: Subscribers,
    reducers: Arc<Mutex<Vec<ReducerFn>>>,
    network_state: watch::Receiver<NetworkState>,
    shutdown_tx: watch::Sender<bool>,
    dispatcher_task: Mutex<Option<JoinHandle<()>>>,
    epic_tasks: Mutex<Vec<JoinHandle<()>>>,
    capacity: usize,
}

impl NodeActionStore {
    /// Create a store with the default channel capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a store that warns once a subscriber has more than
    /// `capacity` actions queued. Nothing is dropped.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let subscribers: Subscribers = Arc::new(Mutex::new(Some(Vec::new())));
        let reducers: Arc<Mutex<Vec<ReducerFn>>> = Arc::new(Mutex::new(Vec::new()));

        let dispatcher_task = tokio::spawn(run_dispatcher(
            inbound_rx,
            Arc::clone(&subscribers),
            Arc::clone(&reducers),
            shutdown_rx,
            capacity.max(1),
        ));

        let network_state = install_reducer(&reducers, NetworkStateReducer);

        Self {
            dispatcher: ActionDispatcher {
                sender: inbound_tx,
                dispatched: Arc::new(AtomicU64::new(0)),
            },
            subscribers,
            reducers,
            network_state,
            shutdown_tx,
            dispatcher_task: Mutex::new(Some(dispatcher_task)),
            epic_tasks: Mutex::new(Vec::new()),
            capacity,
        }
    }

    /// Queue an action for dispatch.
    pub fn dispatch(&self, action: impl Into<NodeAction>) -> Result<(), StoreError> {
        self.dispatcher.dispatch(action)
    }

    /// Cloneable dispatch handle.
    #[must_use]
    pub fn dispatcher(&self) -> ActionDispatcher {
        self.dispatcher.clone()
    }

    /// Subscribe to actions dispatched from now on.
    ///
    /// After shutdown the subscription is already closed.
    #[must_use]
    pub fn subscribe(&self, filter: ActionFilter) -> Subscription {
        debug!(kinds = ?filter.kinds, uuid = ?filter.uuid, "New subscription created");
        let (queue, subscription) = subscription_channel(filter);
        if let Some(subscribers) = self.subscribers.lock().as_mut() {
            subscribers.push(queue);
        }
        subscription
    }

    /// Current per-node websocket status.
    #[must_use]
    pub fn network_state(&self) -> watch::Receiver<NetworkState> {
        self.network_state.clone()
    }

    /// Register a reducer and get a receiver of its state.
    pub fn add_reducer<R: StateReducer>(&self, reducer: R) -> watch::Receiver<R::State> {
        install_reducer(&self.reducers, reducer)
    }

    /// Start an epic. Its subscription is taken before it is spawned, so it
    /// sees every action dispatched after this call returns.
    pub fn register_epic<E: Epic>(&self, epic: Arc<E>) {
        let subscription = self.subscribe(epic.filter());
        let ctx = EpicContext {
            dispatcher: self.dispatcher(),
            network_state: self.network_state.clone(),
        };
        let name = epic.name();
        let mut shutdown = self.shutdown_tx.subscribe();
        let handle = tokio::spawn(async move {
            debug!(epic = name, "Epic started");
            tokio::select! {
                _ = epic.run(subscription, ctx) => {}
                _ = shutdown.changed() => {}
            }
            debug!(epic = name, "Epic stopped");
        });
        self.epic_tasks.lock().push(handle);
    }

    /// Number of actions accepted for dispatch.
    #[must_use]
    pub fn actions_dispatched(&self) -> u64 {
        self.dispatcher.dispatched.load(Ordering::Relaxed)
    }

    /// Backlog above which a subscriber is reported as falling behind.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stop the dispatcher and all epics. Idempotent.
    pub async fn shutdown(&self) {
        if self.shutdown_tx.send_replace(true) {
            return;
        }
        info!("Shutting down action store");

        let dispatcher_task = self.dispatcher_task.lock().take();
        if let Some(task) = dispatcher_task {
            if let Err(e) = task.await {
                warn!(error = %e, "Dispatcher task ended abnormally");
            }
        }

        let epic_tasks: Vec<_> = std::mem::take(&mut *self.epic_tasks.lock());
        for task in epic_tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Epic task ended abnormally");
            }
        }
    }
}

impl Default for NodeActionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn install_reducer<R: StateReducer>(
    reducers: &Mutex<Vec<ReducerFn>>,
    reducer: R,
) -> watch::Receiver<R::State> {
    let (tx, rx) = watch::channel(reducer.initial_state());
    reducers.lock().push(Box::new(move |action| {
        tx.send_if_modified(|state| reducer.reduce(state, action));
    }));
    rx
}

async fn run_dispatcher(
    mut inbound: mpsc::UnboundedReceiver<NodeAction>,
    subscribers: Subscribers,
    reducers: Arc<Mutex<Vec<ReducerFn>>>,
    mut shutdown: watch::Receiver<bool>,
    warn_backlog: usize,
) {
    debug!("Dispatcher started");
    loop {
        let action = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            action = inbound.recv() => match action {
                Some(action) => action,
                None => break,
            },
        };

        for reduce in reducers.lock().iter_mut() {
            reduce(&action);
        }

        let mut guard = subscribers.lock();
        let Some(queues) = guard.as_mut() else {
            break;
        };
        queues.retain_mut(|queue| queue.deliver(&action, warn_backlog));
    }

    // Dropping the queues ends every subscription once drained.
    subscribers.lock().take();
    inbound.close();
    debug!("Dispatcher stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionKind;
    use shared_types::{Node, WebSocketStatus};
    use std::time::Duration;
    use uuid::Uuid;

    fn status(port: u16, status: WebSocketStatus) -> NodeAction {
        NodeAction::WebSocketStatusChanged {
            node: Node::localhost(port),
            status,
        }
    }

    /// Answers every `ConnectWebSocket` with a `Connected` status.
    struct EchoConnected;

    #[async_trait]
    impl Epic for EchoConnected {
        fn name(&self) -> &'static str {
            "echo-connected"
        }

        fn filter(&self) -> ActionFilter {
            ActionFilter::kinds(vec![ActionKind::WebSocketCommand])
        }

        async fn run(self: Arc<Self>, mut actions: Subscription, ctx: EpicContext) {
            while let Some(action) = actions.recv().await {
                if let NodeAction::ConnectWebSocket { node } = action {
                    let _ = ctx.dispatch(NodeAction::WebSocketStatusChanged {
                        node,
                        status: WebSocketStatus::Connected,
                    });
                }
            }
        }
    }

    /// Counts actions of every kind.
    struct CountingReducer;

    impl StateReducer for CountingReducer {
        type State = usize;

        fn initial_state(&self) -> usize {
            0
        }

        fn reduce(&self, state: &mut usize, _action: &NodeAction) -> bool {
            *state += 1;
            true
        }
    }

    /// Counts `ConnectWebSocket` actions into a watch.
    struct CountingEpic {
        seen: watch::Sender<usize>,
    }

    #[async_trait]
    impl Epic for CountingEpic {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn filter(&self) -> ActionFilter {
            ActionFilter::kinds(vec![ActionKind::WebSocketCommand])
        }

        async fn run(self: Arc<Self>, mut actions: Subscription, _ctx: EpicContext) {
            while let Some(action) = actions.recv().await {
                if matches!(action, NodeAction::ConnectWebSocket { .. }) {
                    // Slow consumer
                    tokio::task::yield_now().await;
                    self.seen.send_modify(|count| *count += 1);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_subscribers_see_dispatch_order() {
        let store = NodeActionStore::new();
        let mut a = store.subscribe(ActionFilter::all());
        let mut b = store.subscribe(ActionFilter::all());

        let actions: Vec<_> = (1..=5).map(|p| status(p, WebSocketStatus::Connecting)).collect();
        for action in &actions {
            store.dispatch(action.clone()).unwrap();
        }

        for expected in &actions {
            assert_eq!(a.recv().await.as_ref(), Some(expected));
            assert_eq!(b.recv().await.as_ref(), Some(expected));
        }
        assert_eq!(store.actions_dispatched(), 5);
    }

    #[tokio::test]
    async fn test_network_state_reduced_before_delivery() {
        let store = NodeActionStore::new();
        let mut sub = store.subscribe(ActionFilter::all());
        let state = store.network_state();

        store.dispatch(status(7, WebSocketStatus::Connected)).unwrap();
        sub.recv().await.unwrap();

        assert_eq!(
            state.borrow().status(&Node::localhost(7)),
            WebSocketStatus::Connected
        );
    }

    #[tokio::test]
    async fn test_epic_output_is_dispatched() {
        let store = NodeActionStore::new();
        store.register_epic(Arc::new(EchoConnected));
        let mut statuses = store.subscribe(ActionFilter::kinds(vec![ActionKind::WebSocketStatus]));

        store
            .dispatch(NodeAction::ConnectWebSocket {
                node: Node::localhost(9),
            })
            .unwrap();

        let received = tokio::time::timeout(Duration::from_secs(1), statuses.recv())
            .await
            .unwrap();
        assert_eq!(received, Some(status(9, WebSocketStatus::Connected)));
    }

    #[tokio::test]
    async fn test_custom_reducer() {
        let store = NodeActionStore::new();
        let mut count = store.add_reducer(CountingReducer);
        let mut sub = store.subscribe(ActionFilter::all());

        store
            .dispatch(NodeAction::FindANodeRequest {
                uuid: Uuid::new_v4(),
                shards: Default::default(),
            })
            .unwrap();
        sub.recv().await.unwrap();

        count.changed().await.unwrap();
        assert_eq!(*count.borrow(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_closes_subscriptions() {
        let store = NodeActionStore::with_capacity(16);
        let mut sub = store.subscribe(ActionFilter::all());
        store.register_epic(Arc::new(EchoConnected));

        store.shutdown().await;
        store.shutdown().await;

        assert_eq!(sub.recv().await, None);
        assert_eq!(
            store.dispatch(NodeAction::CloseWebSocket {
                node: Node::localhost(1)
            }),
            Err(StoreError::Closed)
        );
        assert!(store.subscribe(ActionFilter::all()).recv().await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_burst_beyond_capacity_reaches_epic() {
        let store = NodeActionStore::with_capacity(8);
        let (seen, mut count) = watch::channel(0);
        store.register_epic(Arc::new(CountingEpic { seen }));

        for port in 0..100 {
            store
                .dispatch(NodeAction::ConnectWebSocket {
                    node: Node::localhost(port),
                })
                .unwrap();
        }

        tokio::time::timeout(Duration::from_secs(5), count.wait_for(|n| *n == 100))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(store.actions_dispatched(), 100);
    }

    #[tokio::test]
    async fn test_idle_subscriber_keeps_every_action() {
        let store = NodeActionStore::with_capacity(4);
        let uuid = Uuid::new_v4();
        let mut correlated = store.subscribe(ActionFilter::correlated(uuid));

        for _ in 0..50 {
            store
                .dispatch(NodeAction::FindANodeRequest {
                    uuid: Uuid::new_v4(),
                    shards: Default::default(),
                })
                .unwrap();
        }
        let mine = NodeAction::FindANodeRequest {
            uuid,
            shards: Default::default(),
        };
        store.dispatch(mine.clone()).unwrap();

        let received = tokio::time::timeout(Duration::from_secs(1), correlated.recv())
            .await
            .unwrap();
        assert_eq!(received, Some(mine));
    }

    #[tokio::test]
    async fn test_dropped_subscription_is_pruned() {
        let store = NodeActionStore::new();
        let dropped = store.subscribe(ActionFilter::all());
        let mut kept = store.subscribe(ActionFilter::all());
        drop(dropped);

        store.dispatch(status(3, WebSocketStatus::Connected)).unwrap();
        assert_eq!(kept.recv().await, Some(status(3, WebSocketStatus::Connected)));
        assert_eq!(store.subscribers.lock().as_ref().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_default_capacity() {
        let store = NodeActionStore::default();
        assert_eq!(store.capacity(), DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(store.actions_dispatched(), 0);
    }
}
