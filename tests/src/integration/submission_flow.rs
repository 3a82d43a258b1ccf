//! # Submission Flow
//!
//! A signed transfer travels from `TransactionMaker` through the store and
//! `SubmitAtomEpic` to a node over JSON-RPC, and the node's status
//! notifications come back as correlated steps.
//!
//! ```text
//! TransactionMaker ──Request──► FindANodeEpic ──FindANodeResult──► SubmitAtomEpic
//!                                                                     │
//!        ◄──Completed── Status* ◄── Atoms.nextStatusEvent ◄── node ◄──┘ Send
//! ```

#[cfg(test)]
mod tests {
    use crate::integration::support::{
        address, address_of, ledger_with_balance, rri, transfer, wait_for_balance, Harness,
        SubmitReply,
    };
    use lc_04_connection_manager::methods;
    use lc_05_atom_submission::{ResultOfUserAction, UserActionError};
    use serde_json::json;
    use shared_bus::{
        AtomStatus, CompletionPolicy, NotStoredReason, SubmitAtomAction, SubmitAtomError,
    };
    use shared_crypto::KeyPair;
    use shared_types::NonNegativeAmount;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(5);

    async fn steps(result: ResultOfUserAction) -> Vec<SubmitAtomAction> {
        let ResultOfUserAction::PendingSending(mut pending) = result else {
            panic!("transfer was not staged");
        };
        let mut steps = Vec::new();
        while let Some(step) = tokio::time::timeout(TIMEOUT, pending.next_update())
            .await
            .expect("timeout waiting for submission step")
        {
            steps.push(step);
        }
        steps
    }

    /// Test that a stored transfer reports request, send, status, completion
    #[tokio::test]
    async fn test_transfer_is_stored() {
        let harness = Harness::start(SubmitReply::Statuses(vec![AtomStatus::Stored]), TIMEOUT).await;
        let keys = KeyPair::generate().unwrap();
        let ledger = harness.runtime_ledger(&address_of(&keys), 100);
        let maker = harness.maker(&keys, &ledger);

        let result = maker.send(transfer(&keys, 40), None);
        let atom = result.atom().cloned().unwrap();
        let steps = steps(result).await;

        assert_eq!(steps.len(), 4, "steps: {steps:?}");
        assert!(matches!(steps[0], SubmitAtomAction::Request(_)));
        let SubmitAtomAction::Send(send) = &steps[1] else {
            panic!("expected Send, got {:?}", steps[1]);
        };
        assert_eq!(send.node, harness.node);
        let SubmitAtomAction::Status(status) = &steps[2] else {
            panic!("expected Status, got {:?}", steps[2]);
        };
        assert!(status.event.is_stored());
        assert_eq!(status.atom_id, atom.identifier().unwrap());
        let SubmitAtomAction::Completed(completed) = &steps[3] else {
            panic!("expected Completed, got {:?}", steps[3]);
        };
        assert!(completed.is_success());
        assert_eq!(completed.node.as_ref(), Some(&harness.node));

        // The node saw subscribe, submit and finally unsubscribe
        harness
            .wait_for_method(methods::CLOSE_ATOM_STATUS_NOTIFICATIONS)
            .await;
        assert_eq!(
            harness.methods(),
            vec![
                methods::GET_ATOM_STATUS_NOTIFICATIONS,
                methods::SUBMIT_ATOM,
                methods::CLOSE_ATOM_STATUS_NOTIFICATIONS,
            ]
        );

        // The runtime applies the stored atom to its ledger
        wait_for_balance(&ledger, &address_of(&keys), 60).await;
        let balances = ledger.balances().unwrap();
        assert_eq!(
            balances.balance_or_zero(&address_of(&keys), &rri("XRD")),
            NonNegativeAmount::from(60u64)
        );
        assert_eq!(
            balances.balance_or_zero(&address(9), &rri("XRD")),
            NonNegativeAmount::from(40u64)
        );
    }

    /// Test that pending statuses are reported but do not complete
    #[tokio::test]
    async fn test_pending_then_stored() {
        let harness = Harness::start(
            SubmitReply::Statuses(vec![
                AtomStatus::PendingCmVerification,
                AtomStatus::PendingDependencyVerification,
                AtomStatus::Stored,
            ]),
            TIMEOUT,
        )
        .await;
        let keys = KeyPair::generate().unwrap();
        let ledger = ledger_with_balance(&address_of(&keys), 100, 1);

        let steps = steps(harness.maker(&keys, &ledger).send(transfer(&keys, 1), None)).await;
        let statuses: Vec<_> = steps
            .iter()
            .filter_map(|step| match step {
                SubmitAtomAction::Status(status) => Some(status.event.status()),
                _ => None,
            })
            .collect();
        assert_eq!(
            statuses,
            vec![
                AtomStatus::PendingCmVerification,
                AtomStatus::PendingDependencyVerification,
                AtomStatus::Stored,
            ]
        );
        assert!(matches!(
            steps.last(),
            Some(SubmitAtomAction::Completed(c)) if c.is_success()
        ));
    }

    /// Test that the acceptance policy completes on the first status
    #[tokio::test]
    async fn test_acceptance_policy_completes_on_pending() {
        let harness = Harness::start(
            SubmitReply::Statuses(vec![AtomStatus::PendingCmVerification]),
            TIMEOUT,
        )
        .await;
        let keys = KeyPair::generate().unwrap();
        let ledger = ledger_with_balance(&address_of(&keys), 100, 1);
        let maker = harness
            .maker(&keys, &ledger)
            .with_completion(CompletionPolicy::OnSubmissionAccepted);

        let event = maker
            .send(transfer(&keys, 10), None)
            .await_completion()
            .await
            .unwrap();
        assert_eq!(event.status(), AtomStatus::PendingCmVerification);
        assert!(!event.is_stored());
    }

    /// Test that an eviction surfaces as a submission failure
    #[tokio::test]
    async fn test_evicted_atom_fails() {
        let harness = Harness::start(
            SubmitReply::Statuses(vec![AtomStatus::EvictedFailedCmVerification]),
            TIMEOUT,
        )
        .await;
        let keys = KeyPair::generate().unwrap();
        let ledger = ledger_with_balance(&address_of(&keys), 100, 1);

        let result = harness
            .maker(&keys, &ledger)
            .send(transfer(&keys, 10), None)
            .await_completion()
            .await;
        assert_eq!(
            result,
            Err(UserActionError::FailedToSubmitAtom(SubmitAtomError::NotStored(
                NotStoredReason {
                    status: AtomStatus::EvictedFailedCmVerification,
                    data: json!({ "reason": "evicted" }),
                }
            )))
        );
    }

    /// Test that a JSON-RPC error on submit fails the submission
    #[tokio::test]
    async fn test_rejected_submit_fails() {
        let harness = Harness::start(
            SubmitReply::Reject {
                code: -32000,
                message: "atom rejected",
            },
            TIMEOUT,
        )
        .await;
        let keys = KeyPair::generate().unwrap();
        let ledger = ledger_with_balance(&address_of(&keys), 100, 1);

        let result = harness
            .maker(&keys, &ledger)
            .send(transfer(&keys, 10), None)
            .await_completion()
            .await;
        let Err(UserActionError::FailedToSubmitAtom(SubmitAtomError::Rpc(message))) = &result else {
            panic!("expected RPC failure, got {result:?}");
        };
        assert!(message.contains("atom rejected"), "message: {message}");
    }

    /// Test that a node that never reports a status times out exactly once
    #[tokio::test(start_paused = true)]
    async fn test_silent_node_times_out() {
        let harness = Harness::start(SubmitReply::Silent, Duration::from_secs(2)).await;
        let keys = KeyPair::generate().unwrap();
        let ledger = ledger_with_balance(&address_of(&keys), 100, 1);

        let steps = steps(harness.maker(&keys, &ledger).send(transfer(&keys, 10), None)).await;
        let completions: Vec<_> = steps
            .iter()
            .filter_map(|step| match step {
                SubmitAtomAction::Completed(c) => Some(c.result.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(completions, vec![Err(SubmitAtomError::Timeout)]);
        assert!(!steps.iter().any(|s| matches!(s, SubmitAtomAction::Status(_))));
    }

    /// Test that an origin node skips node discovery
    #[tokio::test]
    async fn test_origin_node_is_used() {
        let harness = Harness::start(SubmitReply::Statuses(vec![AtomStatus::Stored]), TIMEOUT).await;
        let keys = KeyPair::generate().unwrap();
        let ledger = ledger_with_balance(&address_of(&keys), 100, 1);

        let steps = steps(
            harness
                .maker(&keys, &ledger)
                .send(transfer(&keys, 10), Some(harness.node.clone())),
        )
        .await;
        let SubmitAtomAction::Request(request) = &steps[0] else {
            panic!("expected Request, got {:?}", steps[0]);
        };
        assert_eq!(request.origin_node.as_ref(), Some(&harness.node));
        assert!(matches!(
            steps.last(),
            Some(SubmitAtomAction::Completed(c)) if c.is_success()
        ));
    }
}
