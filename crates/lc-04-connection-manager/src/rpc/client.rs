//! # JSON-RPC Client
//!
//! Request/response and subscription routing over one [`WebSocketToNode`].
//! A background router owns a listener on the socket; while the client is
//! alive the socket counts as in use.

use crate::domain::RpcError;
use crate::rpc::messages::{methods, AtomStatusNotification, IncomingMessage, RpcRequest};
use crate::service::{Listener, WebSocketToNode};
use lc_02_atom_model::{AtomIdentifier, SignedAtom};
use parking_lot::Mutex;
use serde_json::{json, Value};
use shared_bus::{AtomStatusEvent, SubscriberId};
use shared_types::{Node, WebSocketStatus};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

type PendingCall = oneshot::Sender<Result<Value, RpcError>>;

#[derive(Default)]
struct Routes {
    pending: HashMap<String, PendingCall>,
    subscriptions: HashMap<SubscriberId, mpsc::UnboundedSender<AtomStatusEvent>>,
}

impl Routes {
    /// Fail every in-flight call and end every subscription.
    fn drain(&mut self, node: &Node) {
        if !self.pending.is_empty() || !self.subscriptions.is_empty() {
            debug!(
                node = %node,
                pending = self.pending.len(),
                subscriptions = self.subscriptions.len(),
                "Socket went away, dropping routes"
            );
        }
        for (id, call) in self.pending.drain() {
            let _ = call.send(Err(RpcError::NoResponse(id)));
        }
        self.subscriptions.clear();
    }

    fn route(&mut self, node: &Node, message: IncomingMessage) {
        match message {
            IncomingMessage::Response { id, result } => match self.pending.remove(&id) {
                Some(call) => {
                    let _ = call.send(result);
                }
                None => trace!(node = %node, id = %id, "Response to unknown request"),
            },
            IncomingMessage::Notification { method, params }
                if method == methods::NEXT_STATUS_EVENT =>
            {
                let notification = match AtomStatusNotification::from_params(&params) {
                    Ok(n) => n,
                    Err(e) => {
                        warn!(node = %node, error = %e, "Malformed status notification");
                        return;
                    }
                };
                let subscriber = SubscriberId::from(notification.subscriber_id.as_str());
                let event = notification.into_event();
                let delivered = self
                    .subscriptions
                    .get(&subscriber)
                    .is_some_and(|tx| tx.send(event).is_ok());
                if !delivered {
                    self.subscriptions.remove(&subscriber);
                    trace!(node = %node, subscriber = %subscriber, "Status event without subscriber");
                }
            }
            IncomingMessage::Notification { method, .. } => {
                trace!(node = %node, method = %method, "Ignoring notification");
            }
        }
    }
}

async fn run_router(
    node: Node,
    routes: Arc<Mutex<Routes>>,
    mut listener: Listener,
    mut status: watch::Receiver<WebSocketStatus>,
) {
    loop {
        tokio::select! {
            frame = listener.recv() => {
                let Some(text) = frame else {
                    routes.lock().drain(&node);
                    return;
                };
                match IncomingMessage::parse(&text) {
                    Ok(message) => routes.lock().route(&node, message),
                    Err(e) => warn!(node = %node, error = %e, "Unreadable frame"),
                }
            }
            changed = status.changed() => {
                if changed.is_err() {
                    routes.lock().drain(&node);
                    return;
                }
                let current = *status.borrow_and_update();
                if matches!(
                    current,
                    WebSocketStatus::Closing | WebSocketStatus::Disconnected | WebSocketStatus::Failed
                ) {
                    routes.lock().drain(&node);
                }
            }
        }
    }
}

/// JSON-RPC client bound to one node's socket.
pub struct JsonRpcClient {
    socket: Arc<WebSocketToNode>,
    routes: Arc<Mutex<Routes>>,
    router: JoinHandle<()>,
}

impl JsonRpcClient {
    /// Client over `socket`. The socket need not be connected yet.
    #[must_use]
    pub fn new(socket: Arc<WebSocketToNode>) -> Self {
        let routes = Arc::new(Mutex::new(Routes::default()));
        let router = tokio::spawn(run_router(
            socket.node().clone(),
            Arc::clone(&routes),
            socket.add_listener(),
            socket.status_changes(),
        ));
        Self {
            socket,
            routes,
            router,
        }
    }

    /// Node this client talks to.
    #[must_use]
    pub fn node(&self) -> &Node {
        self.socket.node()
    }

    /// Underlying socket.
    #[must_use]
    pub fn socket(&self) -> &Arc<WebSocketToNode> {
        &self.socket
    }

    /// Send a request and wait for its response.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let request = RpcRequest::new(method, params);
        let text = request.to_text()?;
        let (tx, rx) = oneshot::channel();
        self.routes.lock().pending.insert(request.id.clone(), tx);

        if let Err(e) = self.socket.send_message(text) {
            self.routes.lock().pending.remove(&request.id);
            return Err(e.into());
        }
        debug!(node = %self.node(), method = %method, id = %request.id, "RPC request sent");

        rx.await
            .map_err(|_| RpcError::NoResponse(request.id.clone()))?
    }

    /// `Atoms.submitAtom`.
    pub async fn submit_atom(&self, atom: &SignedAtom) -> Result<Value, RpcError> {
        self.call(methods::SUBMIT_ATOM, lc_01_dson::encode_json(atom))
            .await
    }

    /// `Atoms.getAtomStatusNotifications`: ask the node to push status events
    /// for `atom_id` to `subscriber_id`.
    pub async fn get_atom_status_notifications(
        &self,
        atom_id: &AtomIdentifier,
        subscriber_id: &SubscriberId,
    ) -> Result<Value, RpcError> {
        let params = json!({
            "aid": atom_id.to_hex(),
            "subscriberId": subscriber_id.as_str(),
        });
        self.call(methods::GET_ATOM_STATUS_NOTIFICATIONS, params)
            .await
    }

    /// `Atoms.closeAtomStatusNotifications`.
    pub async fn close_atom_status_notifications(
        &self,
        subscriber_id: &SubscriberId,
    ) -> Result<Value, RpcError> {
        let params = json!({ "subscriberId": subscriber_id.as_str() });
        self.call(methods::CLOSE_ATOM_STATUS_NOTIFICATIONS, params)
            .await
    }

    /// Local stream of status events pushed to `subscriber_id`.
    ///
    /// Register before requesting notifications so no event is missed.
    #[must_use]
    pub fn observe_atom_status_notifications(
        &self,
        subscriber_id: &SubscriberId,
    ) -> AtomStatusNotifications {
        let (tx, rx) = mpsc::unbounded_channel();
        self.routes
            .lock()
            .subscriptions
            .insert(subscriber_id.clone(), tx);
        AtomStatusNotifications {
            subscriber_id: subscriber_id.clone(),
            events: rx,
            routes: Arc::downgrade(&self.routes),
        }
    }
}

impl Drop for JsonRpcClient {
    fn drop(&mut self) {
        self.router.abort();
        self.routes.lock().drain(self.socket.node());
    }
}

impl std::fmt::Debug for JsonRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcClient")
            .field("node", self.node())
            .field("pending", &self.routes.lock().pending.len())
            .finish()
    }
}

/// Status events for one subscriber. Dropping it stops local delivery.
pub struct AtomStatusNotifications {
    subscriber_id: SubscriberId,
    events: mpsc::UnboundedReceiver<AtomStatusEvent>,
    routes: Weak<Mutex<Routes>>,
}

impl AtomStatusNotifications {
    /// Subscriber these events are addressed to.
    #[must_use]
    pub fn subscriber_id(&self) -> &SubscriberId {
        &self.subscriber_id
    }

    /// Next event. `None` once the socket or the client is gone.
    pub async fn recv(&mut self) -> Option<AtomStatusEvent> {
        self.events.recv().await
    }
}

impl futures_util::Stream for AtomStatusNotifications {
    type Item = AtomStatusEvent;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        self.events.poll_recv(cx)
    }
}

impl Drop for AtomStatusNotifications {
    fn drop(&mut self) {
        if let Some(routes) = self.routes.upgrade() {
            routes.lock().subscriptions.remove(&self.subscriber_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConnectionSettings;
    use crate::ports::{MockDialer, MockRemote, WebSocketDialer};
    use shared_bus::AtomStatus;

    async fn connected() -> (JsonRpcClient, MockRemote) {
        let dialer = Arc::new(MockDialer::new());
        let socket = Arc::new(WebSocketToNode::new(
            Node::localhost(8080),
            Arc::clone(&dialer) as Arc<dyn WebSocketDialer>,
            ConnectionSettings::default(),
        ));
        socket.connect_and_notify_when_connected().await.unwrap();
        let remote = dialer.next_remote().await.unwrap();
        (JsonRpcClient::new(socket), remote)
    }

    fn request_id(text: &str) -> (String, String) {
        let wire: Value = serde_json::from_str(text).unwrap();
        (
            wire["id"].as_str().unwrap().to_string(),
            wire["method"].as_str().unwrap().to_string(),
        )
    }

    #[tokio::test]
    async fn test_call_resolves_with_result() {
        let (client, mut remote) = connected().await;
        let client = Arc::new(client);

        let caller = Arc::clone(&client);
        let call = tokio::spawn(async move {
            caller
                .close_atom_status_notifications(&SubscriberId::from("s-1"))
                .await
        });

        let (id, method) = request_id(&remote.next_sent().await.unwrap());
        assert_eq!(method, methods::CLOSE_ATOM_STATUS_NOTIFICATIONS);
        remote.push_text(json!({"jsonrpc": "2.0", "id": id, "result": {"ok": true}}).to_string());

        assert_eq!(call.await.unwrap().unwrap(), json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_remote_error_is_returned() {
        let (client, mut remote) = connected().await;
        let client = Arc::new(client);

        let caller = Arc::clone(&client);
        let call = tokio::spawn(async move { caller.call("Foo.bar", Value::Null).await });

        let (id, _) = request_id(&remote.next_sent().await.unwrap());
        remote.push_text(
            json!({"id": id, "error": {"code": -32601, "message": "no such method"}}).to_string(),
        );

        assert_eq!(
            call.await.unwrap(),
            Err(RpcError::Remote {
                code: -32601,
                message: "no such method".into()
            })
        );
    }

    #[tokio::test]
    async fn test_notifications_routed_by_subscriber() {
        let (client, remote) = connected().await;
        let mut mine = client.observe_atom_status_notifications(&SubscriberId::from("mine"));
        let mut theirs = client.observe_atom_status_notifications(&SubscriberId::from("theirs"));

        let push = |subscriber: &str, status: &str| {
            remote.push_text(
                json!({
                    "jsonrpc": "2.0",
                    "method": methods::NEXT_STATUS_EVENT,
                    "params": {"subscriberId": subscriber, "status": status, "data": {}}
                })
                .to_string(),
            );
        };
        push("theirs", "PENDING_CM_VERIFICATION");
        push("mine", "STORED");

        assert!(mine.recv().await.unwrap().is_stored());
        assert_eq!(
            theirs.recv().await.unwrap().status(),
            AtomStatus::PendingCmVerification
        );
    }

    #[tokio::test]
    async fn test_socket_close_fails_pending_calls() {
        let (client, mut remote) = connected().await;
        let client = Arc::new(client);
        let mut events = client.observe_atom_status_notifications(&SubscriberId::from("s"));

        let caller = Arc::clone(&client);
        let call = tokio::spawn(async move { caller.call("Foo.bar", Value::Null).await });
        remote.next_sent().await.unwrap();
        remote.fail("reset");

        assert!(matches!(call.await.unwrap(), Err(RpcError::NoResponse(_))));
        assert_eq!(events.recv().await, None);
    }

    #[tokio::test]
    async fn test_submit_atom_sends_tagged_json() {
        use lc_02_atom_model::{Atom, MessageParticle, SpunParticle};
        use shared_crypto::{K256Signer, KeyPair};
        use shared_types::{Address, Magic};

        let keys = KeyPair::generate().unwrap();
        let me = Address::new(Magic::default(), &keys.public_key());
        let message = MessageParticle::new(me.clone(), me, b"hi".to_vec());
        let atom = Atom::with_timestamp(vec![[SpunParticle::up(message)].into_iter().collect()], 1)
            .sign(&K256Signer, keys.private_key())
            .unwrap();

        let (client, mut remote) = connected().await;
        let client = Arc::new(client);
        let caller = Arc::clone(&client);
        let expected = atom.clone();
        let call = tokio::spawn(async move { caller.submit_atom(&expected).await });

        let wire: Value = serde_json::from_str(&remote.next_sent().await.unwrap()).unwrap();
        assert_eq!(wire["method"], methods::SUBMIT_ATOM);
        let sent: SignedAtom = lc_01_dson::decode_json(&wire["params"]).unwrap();
        assert_eq!(sent.hash(), atom.hash());

        remote.push_text(json!({"id": wire["id"], "result": null}).to_string());
        assert_eq!(call.await.unwrap().unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_call_on_closed_socket() {
        let dialer: Arc<dyn WebSocketDialer> = Arc::new(MockDialer::new());
        let socket = Arc::new(WebSocketToNode::new(
            Node::localhost(9),
            dialer,
            ConnectionSettings::default(),
        ));
        let client = JsonRpcClient::new(socket);
        assert!(matches!(
            client.call("Foo.bar", Value::Null).await,
            Err(RpcError::Connection(_))
        ));
    }

    #[tokio::test]
    async fn test_client_holds_a_listener() {
        let (client, _remote) = connected().await;
        let socket = Arc::clone(client.socket());
        assert_eq!(socket.listener_count(), 1);
        drop(client);
        for _ in 0..10 {
            if socket.listener_count() == 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(socket.listener_count(), 0);
    }
}
