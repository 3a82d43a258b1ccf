//! # Action Subscriber
//!
//! Receiving side of the node action store. Every subscription owns an
//! unbounded queue that the dispatcher task fills in dispatch order, so a
//! slow subscriber delays nobody and never misses an action.

use crate::actions::{ActionFilter, NodeAction};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;
use tracing::{debug, warn};

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The store was shut down.
    #[error("Action store closed")]
    Closed,
}

/// Create a connected subscriber queue and subscription.
pub(crate) fn subscription_channel(filter: ActionFilter) -> (SubscriberQueue, Subscription) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let backlog = Arc::new(AtomicUsize::new(0));
    let queue = SubscriberQueue {
        filter: filter.clone(),
        sender,
        backlog: Arc::clone(&backlog),
        behind: false,
    };
    let subscription = Subscription {
        receiver,
        filter,
        backlog,
    };
    (queue, subscription)
}

/// Dispatcher side of one subscription.
pub(crate) struct SubscriberQueue {
    filter: ActionFilter,
    sender: mpsc::UnboundedSender<NodeAction>,
    backlog: Arc<AtomicUsize>,
    behind: bool,
}

impl SubscriberQueue {
    /// Queue `action` if it matches the filter. Returns `false` once the
    /// subscription has been dropped.
    ///
    /// Crossing `warn_backlog` queued actions is logged once per episode.
    pub(crate) fn deliver(&mut self, action: &NodeAction, warn_backlog: usize) -> bool {
        if self.sender.is_closed() {
            return false;
        }
        if !self.filter.matches(action) {
            return true;
        }
        if self.sender.send(action.clone()).is_err() {
            return false;
        }

        let backlog = self.backlog.fetch_add(1, Ordering::Relaxed) + 1;
        if backlog > warn_backlog && !self.behind {
            self.behind = true;
            warn!(
                backlog,
                kinds = ?self.filter.kinds,
                uuid = ?self.filter.uuid,
                "Subscriber is falling behind"
            );
        } else if backlog <= warn_backlog / 2 && self.behind {
            self.behind = false;
            debug!(backlog, "Subscriber caught up");
        }
        true
    }
}

/// A subscription handle for receiving actions in dispatch order.
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<NodeAction>,
    filter: ActionFilter,
    backlog: Arc<AtomicUsize>,
}

impl Subscription {
    /// Receive the next action that matches the filter.
    ///
    /// Returns `None` once the store has shut down and the queue is drained.
    pub async fn recv(&mut self) -> Option<NodeAction> {
        let action = self.receiver.recv().await?;
        self.backlog.fetch_sub(1, Ordering::Relaxed);
        Some(action)
    }

    /// Try to receive the next action without waiting.
    ///
    /// - `Ok(Some(action))` - a matching action was queued
    /// - `Ok(None)` - nothing queued
    /// - `Err(SubscriptionError::Closed)` - the store has shut down
    pub fn try_recv(&mut self) -> Result<Option<NodeAction>, SubscriptionError> {
        match self.receiver.try_recv() {
            Ok(action) => {
                self.backlog.fetch_sub(1, Ordering::Relaxed);
                Ok(Some(action))
            }
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(SubscriptionError::Closed),
        }
    }

    /// Actions queued and not yet received.
    #[must_use]
    pub fn backlog(&self) -> usize {
        self.backlog.load(Ordering::Relaxed)
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &ActionFilter {
        &self.filter
    }

    /// Turn the subscription into a [`Stream`].
    #[must_use]
    pub fn into_stream(self) -> ActionStream {
        ActionStream {
            inner: UnboundedReceiverStream::new(self.receiver),
            filter: self.filter,
            backlog: self.backlog,
        }
    }
}

/// A subscription as a `tokio_stream::Stream`.
pub struct ActionStream {
    inner: UnboundedReceiverStream<NodeAction>,
    filter: ActionFilter,
    backlog: Arc<AtomicUsize>,
}

impl ActionStream {
    /// Get the filter for this stream.
    #[must_use]
    pub fn filter(&self) -> &ActionFilter {
        &self.filter
    }
}

impl Stream for ActionStream {
    type Item = NodeAction;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let next = ready!(Pin::new(&mut self.inner).poll_next(cx));
        if next.is_some() {
            self.backlog.fetch_sub(1, Ordering::Relaxed);
        }
        Poll::Ready(next)
    }
}
