//! # Outbound Ports
//!
//! What the submission epic needs from the network, split the way the
//! node's JSON-RPC surface is split so each step can be observed alone.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use lc_02_atom_model::{AtomIdentifier, SignedAtom, TransferrableTokensParticle};
use lc_03_reduction::TokenDefinitionsState;
use lc_04_connection_manager::{ConnectionError, WebSocketToNode};
use shared_bus::{AtomStatusEvent, SubmitAtomError, SubscriberId};
use shared_types::{Address, Node};
use std::sync::Arc;

/// Status events pushed for one subscriber.
pub type AtomStatusEventStream = BoxStream<'static, AtomStatusEvent>;

/// Opens the socket a submission runs over.
#[async_trait]
pub trait WebSocketConnecting: Send + Sync {
    /// The socket to `node`, once connected.
    async fn connect(&self, node: &Node) -> Result<Arc<WebSocketToNode>, ConnectionError>;
}

/// Releases the socket once a submission is done with it.
pub trait WebSocketClosing: Send + Sync {
    /// Close the socket to `node` if nothing else uses it.
    fn close_web_socket_to(&self, node: &Node);
}

/// Local delivery of status notifications.
pub trait AtomStatusObserving: Send + Sync {
    /// Events addressed to `subscriber_id`. Call before requesting them.
    fn observe_atom_status_notifications(&self, subscriber_id: &SubscriberId)
        -> AtomStatusEventStream;
}

/// `Atoms.getAtomStatusNotifications`.
#[async_trait]
pub trait AtomStatusObservationRequesting: Send + Sync {
    /// Ask the node to push status events of `atom_id` to `subscriber_id`.
    async fn send_get_atom_status_notifications(
        &self,
        atom_id: &AtomIdentifier,
        subscriber_id: &SubscriberId,
    ) -> Result<(), SubmitAtomError>;
}

/// `Atoms.submitAtom`.
#[async_trait]
pub trait AtomSubmitting: Send + Sync {
    /// Push `atom` to the node.
    async fn push_atom(&self, atom: &SignedAtom) -> Result<(), SubmitAtomError>;
}

/// `Atoms.closeAtomStatusNotifications`.
#[async_trait]
pub trait AtomStatusObservationCancelling: Send + Sync {
    /// Stop status events to `subscriber_id`.
    async fn close_atom_status_notifications(
        &self,
        subscriber_id: &SubscriberId,
    ) -> Result<(), SubmitAtomError>;
}

/// The collaborators of one submission, bound to one socket.
#[derive(Clone)]
pub struct SubmissionClients {
    /// Status delivery.
    pub observer: Arc<dyn AtomStatusObserving>,
    /// Status subscription.
    pub requester: Arc<dyn AtomStatusObservationRequesting>,
    /// Atom push.
    pub submitter: Arc<dyn AtomSubmitting>,
    /// Subscription cancellation.
    pub canceller: Arc<dyn AtomStatusObservationCancelling>,
}

/// Builds the collaborators for a connected socket.
pub trait SubmissionClientFactory: Send + Sync {
    /// Collaborators talking over `socket`.
    fn clients_for(&self, socket: Arc<WebSocketToNode>) -> SubmissionClients;
}

/// Ledger view the transaction maker stages transfers against.
pub trait LedgerState: Send + Sync {
    /// Token particles currently up and owned by `owner`.
    fn unspent_tokens(&self, owner: &Address) -> Vec<TransferrableTokensParticle>;

    /// Known token definitions.
    fn token_definitions(&self) -> TokenDefinitionsState;
}
