//! Test support: a scripted node behind the mock dialer, a runtime harness
//! and ledger fixtures.

use client_runtime::{ClientConfig, ClientRuntime, SubmissionConfig};
use lc_02_atom_model::{
    SpunParticle, TokenDefinitionParticle, TokenSupplyType, TransferrableTokensParticle,
    UnallocatedTokensParticle,
};
use lc_03_reduction::TransferTokensAction;
use lc_04_connection_manager::{methods, MockDialer, MockRemote};
use lc_05_atom_submission::{InMemoryLedgerState, TransactionMaker};
use parking_lot::Mutex;
use serde_json::{json, Value};
use shared_bus::AtomStatus;
use shared_crypto::{K256Signer, KeyPair};
use shared_types::{
    Address, Description, Magic, Name, Node, NonNegativeAmount, PositiveAmount, PublicKey, ResourceIdentifier,
    Symbol, TokenPermissions,
};
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// SCRIPTED NODE
// =============================================================================

/// How the node answers `Atoms.submitAtom`.
#[derive(Debug, Clone)]
pub enum SubmitReply {
    /// Accept, then notify these statuses in order.
    Statuses(Vec<AtomStatus>),
    /// Answer with a JSON-RPC error.
    Reject { code: i64, message: &'static str },
    /// Accept and never report a status.
    Silent,
}

/// Serve JSON-RPC on `remote` until the client closes the link. Every
/// method received is appended to `seen`.
pub async fn serve(mut remote: MockRemote, reply: SubmitReply, seen: Arc<Mutex<Vec<String>>>) {
    let mut subscriber: Option<String> = None;
    while let Some(frame) = remote.next_sent().await {
        let Ok(request) = serde_json::from_str::<Value>(&frame) else {
            continue;
        };
        let id = request["id"].clone();
        let method = request["method"].as_str().unwrap_or_default().to_string();
        seen.lock().push(method.clone());

        match method.as_str() {
            methods::GET_ATOM_STATUS_NOTIFICATIONS => {
                subscriber = request["params"]["subscriberId"]
                    .as_str()
                    .map(str::to_string);
                respond(&remote, &id, json!({ "success": true }));
            }
            methods::SUBMIT_ATOM => match &reply {
                SubmitReply::Reject { code, message } => {
                    remote.push_text(
                        json!({
                            "jsonrpc": "2.0",
                            "id": id,
                            "error": { "code": code, "message": message },
                        })
                        .to_string(),
                    );
                }
                SubmitReply::Statuses(statuses) => {
                    respond(&remote, &id, json!({ "success": true }));
                    let subscriber = subscriber.clone().unwrap_or_default();
                    for status in statuses {
                        notify(&remote, &subscriber, *status);
                    }
                }
                SubmitReply::Silent => respond(&remote, &id, json!({ "success": true })),
            },
            _ => respond(&remote, &id, json!({ "success": true })),
        }
    }
}

fn respond(remote: &MockRemote, id: &Value, result: Value) {
    remote.push_text(json!({ "jsonrpc": "2.0", "id": id, "result": result }).to_string());
}

/// Detail a node attaches to a status.
fn detail(status: AtomStatus) -> Value {
    if status.is_pending() || status == AtomStatus::Stored {
        json!({})
    } else {
        json!({ "reason": "evicted" })
    }
}

fn notify(remote: &MockRemote, subscriber: &str, status: AtomStatus) {
    remote.push_text(
        json!({
            "jsonrpc": "2.0",
            "method": methods::NEXT_STATUS_EVENT,
            "params": {
                "subscriberId": subscriber,
                "status": status,
                "data": detail(status),
            },
        })
        .to_string(),
    );
}

// =============================================================================
// RUNTIME HARNESS
// =============================================================================

/// A started runtime connected to one scripted node.
pub struct Harness {
    pub runtime: ClientRuntime,
    pub dialer: Arc<MockDialer>,
    pub node: Node,
    pub seen: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    /// Start the runtime and wait until its node is connected.
    pub async fn start(reply: SubmitReply, timeout: Duration) -> Self {
        let node = Node::localhost(8080);
        let dialer = Arc::new(MockDialer::new());
        let config = ClientConfig {
            nodes: vec![node.clone()],
            submission: SubmissionConfig { timeout },
            ..ClientConfig::default()
        };
        let runtime = ClientRuntime::with_dialer(config, dialer.clone());
        runtime.start().unwrap();

        let remote = dialer.next_remote().await.unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        tokio::spawn(serve(remote, reply, Arc::clone(&seen)));

        let mut network = runtime.store().network_state();
        network
            .wait_for(|state| state.status(&node).is_ready())
            .await
            .unwrap();

        Self {
            runtime,
            dialer,
            node,
            seen,
        }
    }

    /// Maker signing with `keys` against `ledger`.
    pub fn maker(&self, keys: &KeyPair, ledger: &Arc<InMemoryLedgerState>) -> TransactionMaker {
        TransactionMaker::new(
            Arc::clone(self.runtime.store()),
            ledger.clone(),
            Arc::new(K256Signer),
            keys.private_key().clone(),
        )
    }

    /// The runtime's own ledger, seeded so `owner` holds `balance` XRD.
    /// Atoms the node stores are applied to it by the runtime.
    pub fn runtime_ledger(&self, owner: &Address, balance: u64) -> Arc<InMemoryLedgerState> {
        let ledger = Arc::clone(self.runtime.ledger());
        seed_balance(&ledger, owner, balance, 1);
        ledger
    }

    /// Methods the node has received so far.
    pub fn methods(&self) -> Vec<String> {
        self.seen.lock().clone()
    }

    /// Wait until the node has received `method`.
    pub async fn wait_for_method(&self, method: &str) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !self.methods().iter().any(|m| m == method) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }
}

// =============================================================================
// LEDGER FIXTURES
// =============================================================================

pub fn address(seed: u8) -> Address {
    let mut key = [seed; 33];
    key[0] = 0x02;
    Address::new(Magic::default(), &PublicKey::from_slice(&key).unwrap())
}

pub fn address_of(keys: &KeyPair) -> Address {
    Address::new(Magic::default(), &keys.public_key())
}

pub fn rri(symbol: &str) -> ResourceIdentifier {
    ResourceIdentifier::new(address(1), symbol).unwrap()
}

/// Ledger where `owner` holds `balance` of XRD with the given granularity.
pub fn ledger_with_balance(owner: &Address, balance: u64, granularity: u64) -> Arc<InMemoryLedgerState> {
    let ledger = InMemoryLedgerState::new();
    seed_balance(&ledger, owner, balance, granularity);
    Arc::new(ledger)
}

/// Define XRD in `ledger` and give `owner` `balance` of it.
pub fn seed_balance(ledger: &InMemoryLedgerState, owner: &Address, balance: u64, granularity: u64) {
    let granularity_amount = PositiveAmount::from_u64(granularity).unwrap();
    let definition = TokenDefinitionParticle::new(
        address(1),
        &Symbol::new("XRD").unwrap(),
        Name::new("Rads").unwrap(),
        Description::new("Native token").unwrap(),
        granularity_amount,
        TokenSupplyType::Mutable {
            permissions: TokenPermissions::default(),
        },
    )
    .unwrap();
    let supply = UnallocatedTokensParticle::new(
        rri("XRD"),
        granularity_amount,
        TokenPermissions::default(),
        PositiveAmount::from_u64(1_000_000).unwrap(),
    );
    let tokens = TransferrableTokensParticle::new(
        owner.clone(),
        PositiveAmount::from_u64(balance).unwrap(),
        rri("XRD"),
        TokenPermissions::default(),
        granularity_amount,
    )
    .unwrap();
    ledger.apply(&SpunParticle::up(definition));
    ledger.apply(&SpunParticle::up(supply));
    ledger.apply(&SpunParticle::up(tokens));
}

/// Wait until `ledger` shows `owner` holding `amount` XRD.
pub async fn wait_for_balance(ledger: &InMemoryLedgerState, owner: &Address, amount: u64) {
    let expected = NonNegativeAmount::from(amount);
    let mut balances = ledger.observe_balances(owner);
    tokio::time::timeout(
        Duration::from_secs(5),
        balances.wait_for(|balances| balances.balance_or_zero(owner, &rri("XRD")) == expected),
    )
    .await
    .unwrap()
    .unwrap();
}

/// Transfer of `amount` XRD from the holder of `keys` to `address(9)`.
pub fn transfer(keys: &KeyPair, amount: u64) -> TransferTokensAction {
    TransferTokensAction::new(
        address_of(keys),
        address(9),
        PositiveAmount::from_u64(amount).unwrap(),
        rri("XRD"),
    )
}
