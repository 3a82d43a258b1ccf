//! # Apply Stored Atoms Epic
//!
//! Folds atoms the node reported as stored into the client's ledger view,
//! so balance observers see a transfer once it lands.

use crate::service::InMemoryLedgerState;
use async_trait::async_trait;
use shared_bus::{
    ActionFilter, ActionKind, Epic, EpicContext, NodeAction, SubmitAtomAction, SubmitAtomCompleted,
    Subscription,
};
use std::sync::Arc;
use tracing::{debug, trace};

/// Applies stored submissions to a ledger.
#[derive(Debug, Clone)]
pub struct ApplyStoredAtomsEpic {
    ledger: Arc<InMemoryLedgerState>,
}

impl ApplyStoredAtomsEpic {
    /// Epic writing into `ledger`.
    #[must_use]
    pub fn new(ledger: Arc<InMemoryLedgerState>) -> Self {
        Self { ledger }
    }

    fn on_completed(&self, completed: &SubmitAtomCompleted) {
        match &completed.result {
            Ok(event) if event.is_stored() => {
                debug!(uuid = %completed.uuid, "Applying stored atom");
                self.ledger.apply_atom(completed.atom.atom());
            }
            _ => trace!(uuid = %completed.uuid, "Submission not stored, ledger unchanged"),
        }
    }
}

#[async_trait]
impl Epic for ApplyStoredAtomsEpic {
    fn name(&self) -> &'static str {
        "apply-stored-atoms"
    }

    fn filter(&self) -> ActionFilter {
        ActionFilter::kinds(vec![ActionKind::SubmitAtom])
    }

    async fn run(self: Arc<Self>, mut actions: Subscription, _ctx: EpicContext) {
        while let Some(action) = actions.recv().await {
            if let NodeAction::SubmitAtom(SubmitAtomAction::Completed(completed)) = action {
                self.on_completed(&completed);
            }
        }
    }
}
