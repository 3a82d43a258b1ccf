//! # Connection Flow
//!
//! Submissions borrow the socket the runtime opened for a node, and the
//! socket is closed once the last submission using it is done.

#[cfg(test)]
mod tests {
    use crate::integration::support::{
        address_of, ledger_with_balance, transfer, Harness, SubmitReply,
    };
    use client_runtime::{ClientConfig, ClientRuntime};
    use lc_04_connection_manager::{MockDialBehavior, MockDialer};
    use lc_05_atom_submission::{TransactionMaker, UserActionError};
    use shared_bus::{AtomStatus, SubmitAtomError};
    use shared_crypto::{K256Signer, KeyPair};
    use shared_types::{Node, WebSocketStatus};
    use std::sync::Arc;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(5);

    /// Test that submissions reuse the runtime's socket to the node
    #[tokio::test]
    async fn test_submissions_share_one_socket() {
        let harness = Harness::start(SubmitReply::Statuses(vec![AtomStatus::Stored]), TIMEOUT).await;
        let keys = KeyPair::generate().unwrap();
        let ledger = ledger_with_balance(&address_of(&keys), 100, 1);
        let maker = harness.maker(&keys, &ledger);

        for amount in [10, 20] {
            assert!(maker.send(transfer(&keys, amount), None).complete_within(TIMEOUT).await);
        }

        assert_eq!(harness.dialer.dial_count(), 1);
        assert_eq!(harness.runtime.manager().nodes().await.unwrap(), vec![harness.node.clone()]);
    }

    /// Test that the socket is closed after the close delay once unused
    #[tokio::test(start_paused = true)]
    async fn test_unused_socket_closes_after_submission() {
        let harness = Harness::start(SubmitReply::Statuses(vec![AtomStatus::Stored]), TIMEOUT).await;
        let keys = KeyPair::generate().unwrap();
        let ledger = ledger_with_balance(&address_of(&keys), 100, 1);

        let result = harness.maker(&keys, &ledger).send(transfer(&keys, 10), None);
        assert!(result.complete_within(TIMEOUT).await);

        let mut network = harness.runtime.store().network_state();
        tokio::time::timeout(
            Duration::from_secs(30),
            network.wait_for(|state| state.status(&harness.node) == WebSocketStatus::Disconnected),
        )
        .await
        .unwrap()
        .unwrap();
    }

    /// Test that a node refusing connections fails the submission
    #[tokio::test]
    async fn test_refused_node_fails_submission() {
        let node = Node::localhost(9000);
        let dialer = Arc::new(MockDialer::with_behavior(MockDialBehavior::Refuse));
        let config = ClientConfig {
            nodes: vec![node.clone()],
            ..ClientConfig::default()
        };
        let runtime = ClientRuntime::with_dialer(config, dialer.clone());
        runtime.start().unwrap();

        let keys = KeyPair::generate().unwrap();
        let ledger = ledger_with_balance(&address_of(&keys), 100, 1);
        let maker = TransactionMaker::new(
            Arc::clone(runtime.store()),
            ledger,
            Arc::new(K256Signer),
            keys.private_key().clone(),
        );

        let result = tokio::time::timeout(
            TIMEOUT,
            maker.send(transfer(&keys, 10), Some(node)).await_completion(),
        )
        .await
        .unwrap();
        assert!(
            matches!(
                result,
                Err(UserActionError::FailedToSubmitAtom(SubmitAtomError::Connection(_)))
            ),
            "result: {result:?}"
        );
        assert!(dialer.dial_count() >= 1);
        runtime.shutdown().await;
    }

    /// Test that shutting the runtime down ends pending submissions
    #[tokio::test]
    async fn test_shutdown_ends_pending_submission() {
        let harness = Harness::start(SubmitReply::Silent, TIMEOUT).await;
        let keys = KeyPair::generate().unwrap();
        let ledger = ledger_with_balance(&address_of(&keys), 100, 1);

        let result = harness.maker(&keys, &ledger).send(transfer(&keys, 10), None);
        harness.wait_for_method(lc_04_connection_manager::methods::SUBMIT_ATOM).await;
        harness.runtime.shutdown().await;

        let completion = tokio::time::timeout(TIMEOUT, result.await_completion())
            .await
            .unwrap();
        assert_eq!(completion, Err(UserActionError::StoreClosed));
    }
}
