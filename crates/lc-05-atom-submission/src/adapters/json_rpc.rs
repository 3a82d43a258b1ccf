//! # JSON-RPC Adapter
//!
//! One [`JsonRpcClient`] per submission serves all four status ports.

use crate::ports::{
    AtomStatusEventStream, AtomStatusObservationCancelling, AtomStatusObservationRequesting,
    AtomStatusObserving, AtomSubmitting, SubmissionClientFactory, SubmissionClients,
};
use async_trait::async_trait;
use futures_util::StreamExt;
use lc_02_atom_model::{AtomIdentifier, SignedAtom};
use lc_04_connection_manager::{JsonRpcClient, RpcError, WebSocketToNode};
use shared_bus::{SubmitAtomError, SubscriberId};
use std::sync::Arc;

fn to_submit_error(error: RpcError) -> SubmitAtomError {
    match error {
        RpcError::Connection(e) => SubmitAtomError::Connection(e.to_string()),
        other => SubmitAtomError::Rpc(other.to_string()),
    }
}

impl AtomStatusObserving for JsonRpcClient {
    fn observe_atom_status_notifications(
        &self,
        subscriber_id: &SubscriberId,
    ) -> AtomStatusEventStream {
        JsonRpcClient::observe_atom_status_notifications(self, subscriber_id).boxed()
    }
}

#[async_trait]
impl AtomStatusObservationRequesting for JsonRpcClient {
    async fn send_get_atom_status_notifications(
        &self,
        atom_id: &AtomIdentifier,
        subscriber_id: &SubscriberId,
    ) -> Result<(), SubmitAtomError> {
        self.get_atom_status_notifications(atom_id, subscriber_id)
            .await
            .map(drop)
            .map_err(to_submit_error)
    }
}

#[async_trait]
impl AtomSubmitting for JsonRpcClient {
    async fn push_atom(&self, atom: &SignedAtom) -> Result<(), SubmitAtomError> {
        self.submit_atom(atom)
            .await
            .map(drop)
            .map_err(to_submit_error)
    }
}

#[async_trait]
impl AtomStatusObservationCancelling for JsonRpcClient {
    async fn close_atom_status_notifications(
        &self,
        subscriber_id: &SubscriberId,
    ) -> Result<(), SubmitAtomError> {
        JsonRpcClient::close_atom_status_notifications(self, subscriber_id)
            .await
            .map(drop)
            .map_err(to_submit_error)
    }
}

/// Builds a fresh [`JsonRpcClient`] per socket.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRpcClientFactory;

impl SubmissionClientFactory for JsonRpcClientFactory {
    fn clients_for(&self, socket: Arc<WebSocketToNode>) -> SubmissionClients {
        let client = Arc::new(JsonRpcClient::new(socket));
        SubmissionClients {
            observer: Arc::clone(&client) as Arc<dyn AtomStatusObserving>,
            requester: Arc::clone(&client) as Arc<dyn AtomStatusObservationRequesting>,
            submitter: Arc::clone(&client) as Arc<dyn AtomSubmitting>,
            canceller: client as Arc<dyn AtomStatusObservationCancelling>,
        }
    }
}
