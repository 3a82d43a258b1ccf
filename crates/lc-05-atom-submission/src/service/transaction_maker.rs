//! # Transaction Maker
//!
//! Stages a transfer against the ledger view, signs the resulting atom and
//! dispatches its submission. Staging failures never reach the network.

use crate::domain::{FailedToStageAction, PendingSubmission, ResultOfUserAction, StageError};
use crate::ports::LedgerState;
use lc_02_atom_model::{Atom, SignedAtom, SigningError};
use lc_03_reduction::{TransferTokensAction, TransferTokensActionToParticleGroupsMapper};
use shared_bus::{ActionFilter, CompletionPolicy, NodeActionStore, SubmitAtomAction, SubmitAtomRequest};
use shared_crypto::{EcdsaSigning, PrivateKey};
use shared_types::Node;
use std::sync::Arc;
use tracing::{debug, warn};

/// Turns transfers into submitted atoms, signing with one key.
pub struct TransactionMaker {
    store: Arc<NodeActionStore>,
    ledger: Arc<dyn LedgerState>,
    signer: Arc<dyn EcdsaSigning>,
    key: PrivateKey,
    completion: CompletionPolicy,
    mapper: TransferTokensActionToParticleGroupsMapper,
}

impl TransactionMaker {
    /// Maker completing submissions once the atom is stored.
    #[must_use]
    pub fn new(
        store: Arc<NodeActionStore>,
        ledger: Arc<dyn LedgerState>,
        signer: Arc<dyn EcdsaSigning>,
        key: PrivateKey,
    ) -> Self {
        Self {
            store,
            ledger,
            signer,
            key,
            completion: CompletionPolicy::OnAtomStored,
            mapper: TransferTokensActionToParticleGroupsMapper,
        }
    }

    /// Same maker with another completion policy.
    #[must_use]
    pub fn with_completion(mut self, completion: CompletionPolicy) -> Self {
        self.completion = completion;
        self
    }

    /// Signed atom executing `action`.
    pub fn stage(&self, action: &TransferTokensAction) -> Result<SignedAtom, StageError> {
        let public_key = self
            .signer
            .derive_public_key(&self.key)
            .map_err(SigningError::from)?;
        if action.from.public_key() != public_key {
            return Err(StageError::NotOwner(action.from.to_base58()));
        }

        let unspent = self.ledger.unspent_tokens(&action.from);
        let definitions = self.ledger.token_definitions();
        let groups = self
            .mapper
            .particle_groups(action, &unspent, &definitions)?;
        let atom = Atom::new(groups).sign(self.signer.as_ref(), &self.key)?;
        debug!(atom = %atom, rri = %action.rri, amount = %action.amount, "Staged transfer");
        Ok(atom)
    }

    /// Stage, sign and submit `action`, to `origin_node` if given.
    #[must_use]
    pub fn send(&self, action: TransferTokensAction, origin_node: Option<Node>) -> ResultOfUserAction {
        let atom = match self.stage(&action) {
            Ok(atom) => atom,
            Err(error) => {
                warn!(error = %error, "Failed to stage action");
                return ResultOfUserAction::FailedToStageAction(FailedToStageAction { error, action });
            }
        };
        ResultOfUserAction::PendingSending(self.submit(atom, origin_node))
    }

    /// Submit an already signed atom.
    #[must_use]
    pub fn submit(&self, atom: SignedAtom, origin_node: Option<Node>) -> PendingSubmission {
        let mut request = SubmitAtomRequest::new(atom.clone(), self.completion);
        if let Some(node) = origin_node {
            request = request.with_origin_node(node);
        }
        let uuid = request.uuid;
        // Subscribe first so no step is missed.
        let updates = self.store.subscribe(ActionFilter::correlated(uuid));
        if let Err(e) = self.store.dispatch(SubmitAtomAction::Request(request)) {
            warn!(uuid = %uuid, error = %e, "Submission not dispatched");
        }
        PendingSubmission::new(uuid, atom, updates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserActionError;
    use crate::service::InMemoryLedgerState;
    use crate::test_fixtures::{address, address_of, rri, token_definition, tokens_with_granularity};
    use lc_03_reduction::TransferError;
    use shared_crypto::{K256Signer, KeyPair};
    use shared_types::{NonNegativeAmount, PositiveAmount};

    fn maker_with_balance(keys: &KeyPair, balance: u64, granularity: u64) -> TransactionMaker {
        let ledger = InMemoryLedgerState::new();
        for spun in token_definition("XRD", granularity) {
            ledger.apply(&spun);
        }
        ledger.apply(&lc_02_atom_model::SpunParticle::up(tokens_with_granularity(
            &address_of(keys),
            "XRD",
            balance,
            granularity,
        )));
        TransactionMaker::new(
            Arc::new(NodeActionStore::new()),
            Arc::new(ledger),
            Arc::new(K256Signer),
            keys.private_key().clone(),
        )
    }

    fn transfer(keys: &KeyPair, amount: u64) -> TransferTokensAction {
        TransferTokensAction::new(
            address_of(keys),
            address(9),
            PositiveAmount::from_u64(amount).unwrap(),
            rri("XRD"),
        )
    }

    #[tokio::test]
    async fn test_insufficient_funds_is_not_staged() {
        let keys = KeyPair::generate().unwrap();
        let maker = maker_with_balance(&keys, 30, 1);

        let result = maker.send(transfer(&keys, 50), None);
        assert!(!result.is_staged());
        let ResultOfUserAction::FailedToStageAction(failed) = result else {
            panic!("expected staging failure");
        };
        assert_eq!(
            failed.error,
            StageError::Transfer(TransferError::InsufficientFunds {
                current_balance: NonNegativeAmount::from(30),
                requested: PositiveAmount::from_u64(50).unwrap(),
            })
        );
    }

    #[tokio::test]
    async fn test_granularity_is_checked() {
        let keys = KeyPair::generate().unwrap();
        let maker = maker_with_balance(&keys, 100, 5);

        let error = maker.stage(&transfer(&keys, 7)).unwrap_err();
        assert!(matches!(
            error,
            StageError::Transfer(TransferError::AmountNotMultipleOfGranularity { amount, granularity })
                if amount == PositiveAmount::from_u64(7).unwrap()
                    && granularity == PositiveAmount::from_u64(5).unwrap()
        ));

        let atom = maker.stage(&transfer(&keys, 20)).unwrap();
        atom.verify(&K256Signer, &keys.public_key()).unwrap();
    }

    #[tokio::test]
    async fn test_foreign_sender_is_rejected() {
        let keys = KeyPair::generate().unwrap();
        let other = KeyPair::generate().unwrap();
        let maker = maker_with_balance(&keys, 100, 1);
        assert!(matches!(
            maker.stage(&transfer(&other, 10)),
            Err(StageError::NotOwner(_))
        ));
    }

    #[tokio::test]
    async fn test_staging_failure_surfaces_on_completion() {
        let keys = KeyPair::generate().unwrap();
        let maker = maker_with_balance(&keys, 1, 1);
        let result = maker.send(transfer(&keys, 2), None);
        assert!(matches!(result.atom(), Err(UserActionError::FailedToStageAction(_))));
        assert!(matches!(
            result.await_completion().await,
            Err(UserActionError::FailedToStageAction(_))
        ));
    }

    #[tokio::test]
    async fn test_send_dispatches_request() {
        let keys = KeyPair::generate().unwrap();
        let maker = maker_with_balance(&keys, 100, 1);
        let mut requests = maker
            .store
            .subscribe(ActionFilter::kinds(vec![shared_bus::ActionKind::SubmitAtom]));

        let origin = Node::localhost(8080);
        let result = maker.send(transfer(&keys, 40), Some(origin.clone()));
        let ResultOfUserAction::PendingSending(pending) = result else {
            panic!("expected pending submission");
        };

        let Some(shared_bus::NodeAction::SubmitAtom(SubmitAtomAction::Request(request))) =
            requests.recv().await
        else {
            panic!("expected request");
        };
        assert_eq!(request.uuid, pending.uuid());
        assert_eq!(request.origin_node, Some(origin));
        assert_eq!(request.completion, CompletionPolicy::OnAtomStored);
        assert_eq!(&request.atom, pending.atom());
    }
}
