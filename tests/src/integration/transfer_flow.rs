//! # Transfer Flow
//!
//! Transfers are staged against the client's ledger view. Failures to stage
//! come back as `FailedToStageAction` and never reach the node.

#[cfg(test)]
mod tests {
    use crate::integration::support::{
        address_of, ledger_with_balance, rri, transfer, wait_for_balance, Harness, SubmitReply,
    };
    use lc_03_reduction::TransferError;
    use lc_05_atom_submission::{ResultOfUserAction, StageError, UserActionError};
    use shared_bus::AtomStatus;
    use shared_crypto::KeyPair;
    use shared_types::{NonNegativeAmount, PositiveAmount};
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(5);

    async fn stored_node() -> Harness {
        Harness::start(SubmitReply::Statuses(vec![AtomStatus::Stored]), TIMEOUT).await
    }

    /// Test that a transfer above the balance is never sent
    #[tokio::test]
    async fn test_insufficient_funds() {
        let harness = stored_node().await;
        let keys = KeyPair::generate().unwrap();
        let ledger = ledger_with_balance(&address_of(&keys), 30, 1);

        let result = harness.maker(&keys, &ledger).send(transfer(&keys, 50), None);
        let ResultOfUserAction::FailedToStageAction(failed) = &result else {
            panic!("transfer should not stage");
        };
        assert_eq!(
            failed.error,
            StageError::Transfer(TransferError::InsufficientFunds {
                current_balance: NonNegativeAmount::from(30u64),
                requested: PositiveAmount::from_u64(50).unwrap(),
            })
        );
        assert_eq!(failed.action, transfer(&keys, 50));

        let completion = result.await_completion().await;
        assert!(matches!(
            completion,
            Err(UserActionError::FailedToStageAction(_))
        ));
        tokio::task::yield_now().await;
        assert!(harness.methods().is_empty());
    }

    /// Test that amounts must be a multiple of the token granularity
    #[tokio::test]
    async fn test_granularity() {
        let harness = stored_node().await;
        let keys = KeyPair::generate().unwrap();
        let ledger = ledger_with_balance(&address_of(&keys), 100, 5);
        let maker = harness.maker(&keys, &ledger);

        let result = maker.send(transfer(&keys, 7), None);
        let ResultOfUserAction::FailedToStageAction(failed) = &result else {
            panic!("7 is not a multiple of 5");
        };
        assert_eq!(
            failed.error,
            StageError::Transfer(TransferError::AmountNotMultipleOfGranularity {
                amount: PositiveAmount::from_u64(7).unwrap(),
                granularity: PositiveAmount::from_u64(5).unwrap(),
            })
        );

        let event = maker
            .send(transfer(&keys, 20), None)
            .await_completion()
            .await
            .unwrap();
        assert!(event.is_stored());
    }

    /// Test that successive transfers spend the updated ledger view
    #[tokio::test]
    async fn test_spending_down_a_balance() {
        let harness = stored_node().await;
        let keys = KeyPair::generate().unwrap();
        let me = address_of(&keys);
        let ledger = harness.runtime_ledger(&me, 100);
        let maker = harness.maker(&keys, &ledger);

        for (amount, left) in [(60, 40), (40, 0)] {
            let result = maker.send(transfer(&keys, amount), None);
            assert!(result.complete_within(TIMEOUT).await);
            wait_for_balance(&ledger, &me, left).await;
        }
        assert_eq!(
            ledger.balances().unwrap().balance_or_zero(&me, &rri("XRD")),
            NonNegativeAmount::ZERO
        );

        let result = maker.send(transfer(&keys, 1), None);
        assert!(!result.is_staged());
    }

    /// Test that a transfer from an address the key does not own is rejected
    #[tokio::test]
    async fn test_foreign_sender() {
        let harness = stored_node().await;
        let keys = KeyPair::generate().unwrap();
        let other = KeyPair::generate().unwrap();
        let ledger = ledger_with_balance(&address_of(&other), 100, 1);

        let result = harness.maker(&keys, &ledger).send(transfer(&other, 10), None);
        let ResultOfUserAction::FailedToStageAction(failed) = result else {
            panic!("foreign sender should not stage");
        };
        assert!(matches!(failed.error, StageError::NotOwner(_)));
    }
}
