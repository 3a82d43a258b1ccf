//! # Submit Atom Epic
//!
//! Drives each submission from request to its single completion.
//!
//! ```text
//! Request ──(no origin node)──► FindANodeRequest ··· FindANodeResult
//!    │                                                    │
//!    └──────────────(origin node)─────────► Send ◄────────┘
//!                                             │ connect, observe,
//!                                             │ request notifications, push
//!                                             ▼
//!                                   Status* ──► Completed
//!                                             │
//!                                             ▼
//!                         cancel notifications, release socket
//! ```
//!
//! The whole of `Send` races the submission timeout; whichever finishes
//! first decides the completion.

use crate::ports::{
    AtomStatusObservationCancelling, SubmissionClientFactory, WebSocketClosing, WebSocketConnecting,
};
use async_trait::async_trait;
use futures_util::StreamExt;
use shared_bus::{
    ActionDispatcher, ActionFilter, ActionKind, AtomStatusEvent, CompletionPolicy, Epic,
    EpicContext, NodeAction, SubmitAtomAction, SubmitAtomCompleted, SubmitAtomError,
    SubmitAtomRequest, SubmitAtomSend, SubmitAtomStatus, SubscriberId, Subscription,
};
use shared_types::Node;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Time a submission may take before it completes with a timeout.
pub const DEFAULT_SUBMISSION_TIMEOUT: Duration = Duration::from_secs(30);

/// What a submission has acquired and must give back.
#[derive(Default)]
struct Session {
    subscription: Option<(Arc<dyn AtomStatusObservationCancelling>, SubscriberId)>,
}

/// Submits atoms and reports their status.
pub struct SubmitAtomEpic {
    connector: Arc<dyn WebSocketConnecting>,
    closer: Arc<dyn WebSocketClosing>,
    clients: Arc<dyn SubmissionClientFactory>,
    timeout: Duration,
}

impl SubmitAtomEpic {
    /// Epic with the default timeout.
    #[must_use]
    pub fn new(
        connector: Arc<dyn WebSocketConnecting>,
        closer: Arc<dyn WebSocketClosing>,
        clients: Arc<dyn SubmissionClientFactory>,
    ) -> Self {
        Self {
            connector,
            closer,
            clients,
            timeout: DEFAULT_SUBMISSION_TIMEOUT,
        }
    }

    /// Same epic with another timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Submission timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn on_request(
        &self,
        request: SubmitAtomRequest,
        awaiting_node: &mut HashMap<Uuid, SubmitAtomRequest>,
        ctx: &EpicContext,
    ) {
        let uuid = request.uuid;
        let next = match request.origin_node.clone() {
            Some(node) => NodeAction::from(SubmitAtomAction::Send(SubmitAtomSend {
                uuid,
                atom: request.atom,
                node,
                completion: request.completion,
            })),
            None => {
                let shards = request.shards();
                awaiting_node.insert(uuid, request);
                NodeAction::FindANodeRequest { uuid, shards }
            }
        };
        if let Err(e) = ctx.dispatch(next) {
            warn!(uuid = %uuid, error = %e, "Dropped submission request");
        }
    }

    fn on_node_found(request: SubmitAtomRequest, node: Option<Node>, ctx: &EpicContext) {
        let uuid = request.uuid;
        let next = match node {
            Some(node) => SubmitAtomAction::Send(SubmitAtomSend {
                uuid,
                atom: request.atom,
                node,
                completion: request.completion,
            }),
            None => {
                warn!(uuid = %uuid, "No node to submit to");
                SubmitAtomAction::Completed(SubmitAtomCompleted {
                    uuid,
                    atom: request.atom,
                    node: None,
                    result: Err(SubmitAtomError::NoNodeAvailable),
                })
            }
        };
        if let Err(e) = ctx.dispatch(next) {
            warn!(uuid = %uuid, error = %e, "Dropped submission step");
        }
    }

    async fn submit(self: Arc<Self>, send: SubmitAtomSend, dispatcher: ActionDispatcher) {
        debug!(uuid = %send.uuid, node = %send.node, "Submitting atom");
        let mut session = Session::default();

        let result = match tokio::time::timeout(
            self.timeout,
            self.drive(&send, &dispatcher, &mut session),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(uuid = %send.uuid, timeout = ?self.timeout, "Submission timed out");
                Err(SubmitAtomError::Timeout)
            }
        };

        match &result {
            Ok(event) => info!(uuid = %send.uuid, status = %event.status(), "Submission completed"),
            Err(e) => warn!(uuid = %send.uuid, error = %e, "Submission failed"),
        }
        let completed = SubmitAtomCompleted {
            uuid: send.uuid,
            atom: send.atom,
            node: Some(send.node.clone()),
            result,
        };
        if let Err(e) = dispatcher.dispatch(SubmitAtomAction::Completed(completed)) {
            warn!(uuid = %send.uuid, error = %e, "Dropped submission completion");
        }

        self.release(session, &send.node).await;
    }

    async fn drive(
        &self,
        send: &SubmitAtomSend,
        dispatcher: &ActionDispatcher,
        session: &mut Session,
    ) -> Result<AtomStatusEvent, SubmitAtomError> {
        let atom_id = send
            .atom
            .identifier()
            .map_err(|_| SubmitAtomError::NoIdentifier)?;
        let socket = self
            .connector
            .connect(&send.node)
            .await
            .map_err(|e| SubmitAtomError::Connection(e.to_string()))?;
        let clients = self.clients.clients_for(socket);

        let subscriber_id = SubscriberId::for_atom(&atom_id);
        let mut events = clients
            .observer
            .observe_atom_status_notifications(&subscriber_id);
        session.subscription = Some((Arc::clone(&clients.canceller), subscriber_id.clone()));
        clients
            .requester
            .send_get_atom_status_notifications(&atom_id, &subscriber_id)
            .await?;

        let push = clients.submitter.push_atom(&send.atom);
        tokio::pin!(push);
        let mut pushed = false;
        debug!(uuid = %send.uuid, aid = %atom_id.short(), subscriber = %subscriber_id, "Atom sent");

        loop {
            tokio::select! {
                result = &mut push, if !pushed => {
                    pushed = true;
                    result?;
                    debug!(uuid = %send.uuid, "Node accepted atom");
                }
                event = events.next() => {
                    let Some(event) = event else {
                        return Err(SubmitAtomError::Connection(
                            "status notifications ended".to_string(),
                        ));
                    };
                    let status = SubmitAtomStatus {
                        uuid: send.uuid,
                        atom_id,
                        node: send.node.clone(),
                        event: event.clone(),
                    };
                    if let Err(e) = dispatcher.dispatch(SubmitAtomAction::Status(status)) {
                        warn!(uuid = %send.uuid, error = %e, "Dropped status");
                    }
                    if let Some(result) = terminal(send.completion, event) {
                        return result;
                    }
                }
            }
        }
    }

    async fn release(&self, session: Session, node: &Node) {
        if let Some((canceller, subscriber_id)) = session.subscription {
            match tokio::time::timeout(
                self.timeout,
                canceller.close_atom_status_notifications(&subscriber_id),
            )
            .await
            {
                Ok(Ok(())) => debug!(subscriber = %subscriber_id, "Status notifications closed"),
                Ok(Err(e)) => {
                    warn!(subscriber = %subscriber_id, error = %e, "Closing status notifications failed")
                }
                Err(_) => warn!(subscriber = %subscriber_id, "Closing status notifications timed out"),
            }
        }
        self.closer.close_web_socket_to(node);
    }
}

/// Outcome once `event` ends the submission, `None` while it continues.
fn terminal(
    completion: CompletionPolicy,
    event: AtomStatusEvent,
) -> Option<Result<AtomStatusEvent, SubmitAtomError>> {
    match (completion, &event) {
        (_, AtomStatusEvent::Stored) | (CompletionPolicy::OnSubmissionAccepted, _) => Some(Ok(event)),
        (CompletionPolicy::OnAtomStored, AtomStatusEvent::NotStored(reason)) => {
            if reason.status.is_pending() {
                None
            } else {
                Some(Err(SubmitAtomError::NotStored(reason.clone())))
            }
        }
    }
}

#[async_trait]
impl Epic for SubmitAtomEpic {
    fn name(&self) -> &'static str {
        "submit-atom"
    }

    fn filter(&self) -> ActionFilter {
        ActionFilter::kinds(vec![ActionKind::SubmitAtom, ActionKind::FindANode])
    }

    async fn run(self: Arc<Self>, mut actions: Subscription, ctx: EpicContext) {
        let mut awaiting_node = HashMap::new();
        // Dropping the set aborts submissions still in flight.
        let mut submissions = JoinSet::new();

        loop {
            tokio::select! {
                action = actions.recv() => {
                    let Some(action) = action else { break };
                    match action {
                        NodeAction::SubmitAtom(SubmitAtomAction::Request(request)) => {
                            self.on_request(request, &mut awaiting_node, &ctx);
                        }
                        NodeAction::FindANodeResult { uuid, node } => {
                            if let Some(request) = awaiting_node.remove(&uuid) {
                                Self::on_node_found(request, node, &ctx);
                            }
                        }
                        NodeAction::SubmitAtom(SubmitAtomAction::Send(send)) => {
                            submissions.spawn(Arc::clone(&self).submit(send, ctx.dispatcher()));
                        }
                        _ => {}
                    }
                }
                Some(_) = submissions.join_next(), if !submissions.is_empty() => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epics::FindANodeEpic;
    use crate::ports::{
        MockAtomSubmitter, MockSubmissionClientFactory, MockWebSocketCloser, MockWebSocketConnector,
    };
    use crate::test_fixtures::signed_atom;
    use lc_04_connection_manager::MockDialBehavior;
    use shared_bus::{AtomStatus, NodeActionStore, NotStoredReason};

    struct Harness {
        store: NodeActionStore,
        connector: Arc<MockWebSocketConnector>,
        closer: Arc<MockWebSocketCloser>,
        clients: Arc<MockSubmissionClientFactory>,
    }

    fn harness_with(
        timeout: Duration,
        connector: MockWebSocketConnector,
        clients: MockSubmissionClientFactory,
        nodes: Vec<Node>,
    ) -> Harness {
        let connector = Arc::new(connector);
        let closer = Arc::new(MockWebSocketCloser::new());
        let clients = Arc::new(clients);
        let store = NodeActionStore::new();
        let epic = SubmitAtomEpic::new(
            Arc::clone(&connector) as Arc<dyn WebSocketConnecting>,
            Arc::clone(&closer) as Arc<dyn WebSocketClosing>,
            Arc::clone(&clients) as Arc<dyn SubmissionClientFactory>,
        )
        .with_timeout(timeout);
        store.register_epic(Arc::new(epic));
        store.register_epic(Arc::new(FindANodeEpic::new(nodes)));
        Harness {
            store,
            connector,
            closer,
            clients,
        }
    }

    fn harness(nodes: Vec<Node>) -> Harness {
        harness_with(
            DEFAULT_SUBMISSION_TIMEOUT,
            MockWebSocketConnector::new(),
            MockSubmissionClientFactory::new(),
            nodes,
        )
    }

    fn status(status: AtomStatus) -> AtomStatusEvent {
        AtomStatusEvent::new(status, serde_json::Value::Null)
    }

    /// Dispatch `request` and collect its steps up to the completion.
    async fn run(harness: &Harness, request: SubmitAtomRequest) -> Vec<SubmitAtomAction> {
        let mut steps = harness
            .store
            .subscribe(ActionFilter::correlated(request.uuid));
        harness
            .store
            .dispatch(SubmitAtomAction::Request(request))
            .unwrap();

        let mut seen = Vec::new();
        while let Some(action) = steps.recv().await {
            let NodeAction::SubmitAtom(step) = action else {
                continue;
            };
            if matches!(step, SubmitAtomAction::Request(_)) {
                continue;
            }
            let done = matches!(step, SubmitAtomAction::Completed(_));
            seen.push(step);
            if done {
                break;
            }
        }
        seen
    }

    async fn settle(harness: &Harness) {
        for _ in 0..50 {
            if harness.closer.close_count() > 0 {
                return;
            }
            tokio::task::yield_now().await;
        }
    }

    fn completion(steps: &[SubmitAtomAction]) -> &SubmitAtomCompleted {
        match steps.last() {
            Some(SubmitAtomAction::Completed(completed)) => completed,
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_request_without_origin_completes_when_stored() {
        let node = Node::localhost(8080);
        let harness = harness(vec![node.clone()]);
        harness.clients.observer.send(status(AtomStatus::Stored));

        let request = SubmitAtomRequest::new(signed_atom("stored"), CompletionPolicy::OnAtomStored);
        let uuid = request.uuid;
        let steps = run(&harness, request).await;

        assert_eq!(steps.len(), 3);
        assert!(matches!(&steps[0], SubmitAtomAction::Send(send) if send.node == node));
        assert!(matches!(&steps[1], SubmitAtomAction::Status(s) if s.event.is_stored()));
        assert!(completion(&steps).is_success());
        assert!(steps.iter().all(|s| s.uuid() == uuid));
        assert!(steps.iter().all(|s| s.node() == Some(&node)));

        settle(&harness).await;
        assert_eq!(harness.clients.observer.observe_count(), 1);
        assert_eq!(harness.clients.requester.call_count(), 1);
        assert_eq!(harness.clients.submitter.call_count(), 1);
        assert_eq!(harness.clients.canceller.call_count(), 1);
        assert_eq!(harness.connector.connected_nodes(), vec![node.clone()]);
        assert_eq!(harness.closer.closed_nodes(), vec![node]);
    }

    #[tokio::test]
    async fn test_origin_node_skips_discovery() {
        let origin = Node::localhost(9000);
        let harness = harness(vec![Node::localhost(8080)]);
        harness.clients.observer.send(status(AtomStatus::Stored));

        let request = SubmitAtomRequest::new(signed_atom("origin"), CompletionPolicy::OnAtomStored)
            .with_origin_node(origin.clone());
        let steps = run(&harness, request).await;

        assert_eq!(steps.len(), 3);
        assert!(matches!(&steps[0], SubmitAtomAction::Send(send) if send.node == origin));
        assert!(completion(&steps).is_success());
        assert_eq!(harness.connector.connected_nodes(), vec![origin]);
    }

    #[tokio::test]
    async fn test_pending_status_completes_when_acceptance_is_enough() {
        let harness = harness(vec![Node::localhost(8080)]);
        let pending = status(AtomStatus::PendingDependencyVerification);
        harness.clients.observer.send(pending.clone());

        let request = SubmitAtomRequest::new(
            signed_atom("accepted"),
            CompletionPolicy::OnSubmissionAccepted,
        );
        let steps = run(&harness, request).await;

        assert_eq!(steps.len(), 3);
        assert!(matches!(&steps[1], SubmitAtomAction::Status(s) if s.event == pending));
        assert_eq!(completion(&steps).result, Ok(pending));
    }

    #[tokio::test]
    async fn test_pending_then_stored() {
        let harness = harness(vec![Node::localhost(8080)]);
        harness
            .clients
            .observer
            .send(status(AtomStatus::PendingCmVerification));
        harness.clients.observer.send(status(AtomStatus::Stored));

        let request = SubmitAtomRequest::new(signed_atom("two"), CompletionPolicy::OnAtomStored);
        let steps = run(&harness, request).await;

        assert_eq!(steps.len(), 4);
        assert!(completion(&steps).is_success());
    }

    #[tokio::test]
    async fn test_not_stored_fails_submission() {
        let harness = harness(vec![Node::localhost(8080)]);
        harness
            .clients
            .observer
            .send(status(AtomStatus::EvictedFailedCmVerification));

        let request = SubmitAtomRequest::new(signed_atom("evicted"), CompletionPolicy::OnAtomStored);
        let steps = run(&harness, request).await;

        assert_eq!(
            completion(&steps).result,
            Err(SubmitAtomError::NotStored(NotStoredReason {
                status: AtomStatus::EvictedFailedCmVerification,
                data: serde_json::Value::Null,
            }))
        );
        settle(&harness).await;
        assert_eq!(harness.clients.canceller.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_node_times_out_once() {
        let origin = Node::localhost(8080);
        let harness = harness_with(
            Duration::from_secs(1),
            MockWebSocketConnector::new(),
            MockSubmissionClientFactory::new(),
            Vec::new(),
        );
        let mut later = harness.store.subscribe(ActionFilter::kinds(vec![ActionKind::SubmitAtom]));

        let request = SubmitAtomRequest::new(signed_atom("silent"), CompletionPolicy::OnAtomStored)
            .with_origin_node(origin.clone());
        let steps = run(&harness, request).await;

        assert_eq!(steps.len(), 2);
        assert!(matches!(&steps[0], SubmitAtomAction::Send(_)));
        assert_eq!(completion(&steps).result, Err(SubmitAtomError::Timeout));

        settle(&harness).await;
        assert_eq!(harness.clients.canceller.call_count(), 1);
        assert_eq!(harness.closer.closed_nodes(), vec![origin]);

        tokio::time::sleep(Duration::from_secs(10)).await;
        let mut completions = 0;
        while let Ok(Some(action)) = later.try_recv() {
            if matches!(action, NodeAction::SubmitAtom(SubmitAtomAction::Completed(_))) {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_then_silence_times_out() {
        let harness = harness_with(
            Duration::from_secs(1),
            MockWebSocketConnector::new(),
            MockSubmissionClientFactory::new(),
            vec![Node::localhost(8080)],
        );
        let pending = status(AtomStatus::PendingDependencyVerification);
        harness.clients.observer.send(pending.clone());

        let request = SubmitAtomRequest::new(signed_atom("pending"), CompletionPolicy::OnAtomStored);
        let steps = run(&harness, request).await;

        assert_eq!(steps.len(), 3);
        assert!(matches!(&steps[1], SubmitAtomAction::Status(s) if s.event == pending));
        assert_eq!(completion(&steps).result, Err(SubmitAtomError::Timeout));
    }

    #[tokio::test]
    async fn test_no_node_available() {
        let harness = harness(Vec::new());
        let request = SubmitAtomRequest::new(signed_atom("nowhere"), CompletionPolicy::OnAtomStored);
        let steps = run(&harness, request).await;

        assert_eq!(steps.len(), 1);
        let completed = completion(&steps);
        assert_eq!(completed.result, Err(SubmitAtomError::NoNodeAvailable));
        assert_eq!(completed.node, None);
        assert_eq!(harness.connector.connect_count(), 0);
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let harness = harness_with(
            DEFAULT_SUBMISSION_TIMEOUT,
            MockWebSocketConnector::with_behavior(MockDialBehavior::Refuse),
            MockSubmissionClientFactory::new(),
            vec![Node::localhost(8080)],
        );
        let request = SubmitAtomRequest::new(signed_atom("refused"), CompletionPolicy::OnAtomStored);
        let steps = run(&harness, request).await;

        assert!(matches!(
            completion(&steps).result,
            Err(SubmitAtomError::Connection(_))
        ));
        settle(&harness).await;
        assert_eq!(harness.clients.observer.observe_count(), 0);
        assert_eq!(harness.clients.canceller.call_count(), 0);
        assert_eq!(harness.closer.close_count(), 1);
    }

    #[tokio::test]
    async fn test_rejected_push_fails_submission() {
        let harness = harness_with(
            DEFAULT_SUBMISSION_TIMEOUT,
            MockWebSocketConnector::new(),
            MockSubmissionClientFactory::with_submitter(MockAtomSubmitter::resolving(Err(
                SubmitAtomError::Rpc("invalid atom".into()),
            ))),
            vec![Node::localhost(8080)],
        );
        let request = SubmitAtomRequest::new(signed_atom("rejected"), CompletionPolicy::OnAtomStored);
        let steps = run(&harness, request).await;

        assert_eq!(
            completion(&steps).result,
            Err(SubmitAtomError::Rpc("invalid atom".into()))
        );
        settle(&harness).await;
        assert_eq!(harness.clients.canceller.call_count(), 1);
    }

    #[test]
    fn test_terminal_statuses() {
        let stored = CompletionPolicy::OnAtomStored;
        assert_eq!(terminal(stored, status(AtomStatus::Stored)), Some(Ok(status(AtomStatus::Stored))));
        assert_eq!(terminal(stored, status(AtomStatus::MissingDependency)), None);
        let detail = serde_json::json!({"conflictsWith": "abcd"});
        assert_eq!(
            terminal(
                stored,
                AtomStatusEvent::new(AtomStatus::ConflictLoser, detail.clone())
            ),
            Some(Err(SubmitAtomError::NotStored(NotStoredReason {
                status: AtomStatus::ConflictLoser,
                data: detail,
            })))
        );
        let accepted = CompletionPolicy::OnSubmissionAccepted;
        assert!(matches!(
            terminal(accepted, status(AtomStatus::ConflictLoser)),
            Some(Ok(_))
        ));
    }
}
