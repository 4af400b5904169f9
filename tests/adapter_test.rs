mod common;

use std::sync::Arc;

use common::{FakeContract, ALICE};
use secure_whispers::{AdapterError, ContractAdapter, Notification, Notifier, Severity, WalletSession};
use tokio::sync::mpsc::UnboundedReceiver;

fn drain(rx: &mut UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(n) = rx.try_recv() {
        out.push(n);
    }
    out
}

fn adapter(
    contract: FakeContract,
    wallet: WalletSession,
) -> (
    ContractAdapter<FakeContract>,
    Arc<FakeContract>,
    UnboundedReceiver<Notification>,
) {
    let contract = Arc::new(contract);
    let (notifier, rx) = Notifier::channel();
    (
        ContractAdapter::new(contract.clone(), wallet, notifier),
        contract,
        rx,
    )
}

#[tokio::test]
async fn test_writes_without_wallet_never_reach_contract() {
    let (adapter, contract, mut rx) = adapter(FakeContract::default(), WalletSession::disconnected());

    assert!(matches!(
        adapter.register_user().await,
        Err(AdapterError::WalletNotConnected)
    ));
    assert!(matches!(
        adapter.create_proposal(100).await,
        Err(AdapterError::WalletNotConnected)
    ));
    assert!(matches!(
        adapter.submit_feedback(1, "hi", 5).await,
        Err(AdapterError::WalletNotConnected)
    ));
    assert!(matches!(
        adapter.close_proposal(1).await,
        Err(AdapterError::WalletNotConnected)
    ));
    assert_eq!(contract.writes(), 0);

    let notes = drain(&mut rx);
    assert_eq!(notes.len(), 4);
    assert!(notes
        .iter()
        .all(|n| n.title == "Wallet Not Connected" && n.severity == Severity::Destructive));
    assert_eq!(
        notes[2].description,
        "Please connect your wallet to submit feedback"
    );
}

#[tokio::test]
async fn test_successful_writes_notify() {
    let (adapter, contract, mut rx) =
        adapter(FakeContract::default(), WalletSession::connected(ALICE));

    adapter.register_user().await.unwrap();
    adapter.create_proposal(1_700_000_000).await.unwrap();
    adapter.submit_feedback(1, "Looks good", 5).await.unwrap();
    adapter.close_proposal(1).await.unwrap();
    assert_eq!(contract.writes(), 4);
    assert!(!adapter.is_pending());

    let titles: Vec<String> = drain(&mut rx).into_iter().map(|n| n.title).collect();
    assert_eq!(
        titles,
        vec![
            "User Registered",
            "Proposal Created",
            "Feedback Submitted",
            "Proposal Closed"
        ]
    );
}

#[tokio::test]
async fn test_submit_builds_placeholder_payload() {
    let (adapter, contract, _rx) =
        adapter(FakeContract::default(), WalletSession::connected(ALICE));

    adapter.submit_feedback(1, "Looks good", 5).await.unwrap();
    let payload = contract.last_payload().unwrap();
    assert_eq!(payload.proposal_id, alloy::primitives::U256::from(1));
    assert_eq!(
        payload.content_hash.to_string(),
        "0x0000000000000000000000000000000000000000360955469927618526015332"
    );
    assert_eq!(payload.rating, alloy::primitives::B256::with_last_byte(5));
    assert_eq!(payload.proof.len(), 64);
}

#[tokio::test]
async fn test_invalid_payload_fails_before_remote_call() {
    let (adapter, contract, mut rx) =
        adapter(FakeContract::default(), WalletSession::connected(ALICE));

    assert!(matches!(
        adapter.submit_feedback(1, "text", 9).await,
        Err(AdapterError::ContractError(_))
    ));
    assert!(contract.last_payload().is_none());
    assert_eq!(contract.writes(), 0);
    let notes = drain(&mut rx);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Feedback Submission Failed");
}

#[tokio::test]
async fn test_rejected_writes_notify_failure() {
    let (adapter, contract, mut rx) =
        adapter(FakeContract::failing(), WalletSession::connected(ALICE));

    assert!(adapter.register_user().await.is_err());
    assert!(adapter.close_proposal(3).await.is_err());
    assert_eq!(contract.writes(), 2);
    assert!(!adapter.is_pending());

    let notes = drain(&mut rx);
    assert_eq!(notes[0].title, "Registration Failed");
    assert_eq!(notes[1].title, "Proposal Closing Failed");
    assert!(notes.iter().all(|n| n.severity == Severity::Destructive));
}

#[tokio::test]
async fn test_user_reads_are_skipped_without_address() {
    let (adapter, contract, _rx) =
        adapter(FakeContract::default(), WalletSession::disconnected());

    assert_eq!(adapter.get_user_info().await.unwrap(), None);
    assert_eq!(adapter.get_user_feedbacks().await.unwrap(), None);
    assert_eq!(contract.reads(), 0);

    // Proposal reads do not depend on the wallet
    let info = adapter.get_proposal_info(1).await.unwrap();
    assert!(info.is_active);
    assert_eq!(adapter.get_proposal_feedbacks(1).await.unwrap(), vec![1, 2]);
    assert!(adapter.get_proposal_info(2).await.is_err());
    assert_eq!(contract.reads(), 3);
}

#[tokio::test]
async fn test_user_reads_with_wallet() {
    let (adapter, contract, _rx) =
        adapter(FakeContract::default(), WalletSession::connected(ALICE));

    let info = adapter.get_user_info().await.unwrap().unwrap();
    assert!(info.registered);
    assert_eq!(adapter.get_user_feedbacks().await.unwrap(), Some(vec![1, 2]));
    assert_eq!(contract.reads(), 2);
}
