mod common;

use std::sync::Arc;
use tokio::sync::{mpsc::UnboundedReceiver, Mutex};

use common::{FakeContract, ALICE};
use secure_whispers::{
    submit_feedback, CommentThread, ContractAdapter, FeedbackForm, FormError, FormState,
    Notification, Notifier, SharedThread, WalletSession,
};
use whispers_contract::local_contract::LocalFeedbackContract;

struct Page<C> {
    form: Mutex<FeedbackForm>,
    adapter: ContractAdapter<C>,
    thread: SharedThread,
    notifications: UnboundedReceiver<Notification>,
}

fn page<C>(contract: Arc<C>, wallet: WalletSession, author: &str, content: &str) -> Page<C>
where
    C: whispers_contract::FeedbackContractService + Send + Sync,
{
    let (notifier, notifications) = Notifier::channel();
    let mut form = FeedbackForm::default();
    form.set_author(author);
    form.set_content(content);
    Page {
        form: Mutex::new(form),
        adapter: ContractAdapter::new(contract, wallet, notifier),
        thread: SharedThread::new(CommentThread::seeded()),
        notifications,
    }
}

fn titles(rx: &mut UnboundedReceiver<Notification>) -> Vec<String> {
    let mut out = Vec::new();
    while let Ok(n) = rx.try_recv() {
        out.push(n.title);
    }
    out
}

#[tokio::test]
async fn test_successful_submission_appends_one_comment() {
    let contract = Arc::new(FakeContract::default());
    let mut page = page(
        contract.clone(),
        WalletSession::connected(ALICE),
        "  Sarah Chen ",
        "Looks good\n",
    );

    let comment = submit_feedback(&page.form, &page.adapter, &page.thread)
        .await
        .unwrap();

    assert_eq!(contract.writes(), 1);
    let payload = contract.last_payload().unwrap();
    assert_eq!(payload.proposal_id, alloy::primitives::U256::from(1));
    assert_eq!(payload.rating, alloy::primitives::B256::with_last_byte(5));
    assert_eq!(
        payload.content_hash.to_string(),
        "0x0000000000000000000000000000000000000000360955469927618526015332"
    );

    let comments = page.thread.snapshot().await;
    assert_eq!(comments.len(), 4);
    let last = comments.last().unwrap();
    assert_eq!(last, &comment);
    assert_eq!(last.author, "Sarah Chen");
    assert_eq!(last.content, "Looks good");
    assert!(last.encrypted);
    assert!(!last.is_own);

    let form = page.form.lock().await;
    assert_eq!(form.state(), FormState::Idle);
    assert_eq!((form.author(), form.content()), ("", ""));
    drop(form);

    assert_eq!(
        titles(&mut page.notifications),
        vec!["Feedback Submitted", "Feedback Encrypted & Sent"]
    );
}

#[tokio::test]
async fn test_empty_author_is_blocked() {
    let contract = Arc::new(FakeContract::default());
    let mut page = page(contract.clone(), WalletSession::connected(ALICE), "", "test");

    assert!(matches!(
        submit_feedback(&page.form, &page.adapter, &page.thread).await,
        Err(FormError::IncompleteInformation)
    ));
    assert_eq!(contract.writes(), 0);
    assert_eq!(page.thread.len().await, 3);
    assert_eq!(titles(&mut page.notifications), vec!["Incomplete Information"]);
    assert_eq!(page.form.lock().await.content(), "test");
}

#[tokio::test]
async fn test_disconnected_wallet_is_blocked() {
    let contract = Arc::new(FakeContract::default());
    let mut page = page(contract.clone(), WalletSession::disconnected(), "A", "B");

    assert!(matches!(
        submit_feedback(&page.form, &page.adapter, &page.thread).await,
        Err(FormError::WalletNotConnected)
    ));
    assert_eq!(contract.writes(), 0);
    assert_eq!(page.thread.len().await, 3);
    assert_eq!(titles(&mut page.notifications), vec!["Wallet Not Connected"]);
}

#[tokio::test]
async fn test_failed_call_keeps_input_and_thread() {
    let contract = Arc::new(FakeContract::failing());
    let mut page = page(
        contract.clone(),
        WalletSession::connected(ALICE),
        "Marcus",
        "Needs an audit",
    );

    assert!(matches!(
        submit_feedback(&page.form, &page.adapter, &page.thread).await,
        Err(FormError::SubmissionFailed(_))
    ));
    assert_eq!(contract.writes(), 1);
    assert_eq!(page.thread.len().await, 3);

    let form = page.form.lock().await;
    assert_eq!(form.state(), FormState::Idle);
    assert_eq!((form.author(), form.content()), ("Marcus", "Needs an audit"));
    drop(form);

    assert_eq!(
        titles(&mut page.notifications),
        vec!["Feedback Submission Failed", "Submission Error"]
    );

    // Retry without retyping once the contract accepts again
    contract
        .fail_writes
        .store(false, std::sync::atomic::Ordering::SeqCst);
    submit_feedback(&page.form, &page.adapter, &page.thread)
        .await
        .unwrap();
    assert_eq!(page.thread.len().await, 4);
}

#[tokio::test]
async fn test_second_submit_while_in_flight_is_refused() {
    let contract = Arc::new(FakeContract::default());
    let page = page(contract.clone(), WalletSession::connected(ALICE), "A", "B");

    // First submission has passed validation and is waiting on the contract
    let submission = page.form.lock().await.begin_submit(true).unwrap();
    assert_eq!(submission.content, "B");

    assert!(matches!(
        submit_feedback(&page.form, &page.adapter, &page.thread).await,
        Err(FormError::AlreadySubmitting)
    ));
    assert_eq!(contract.writes(), 0);
    assert_eq!(page.thread.len().await, 3);
}

#[tokio::test]
async fn test_offline_ledger_records_feedback() {
    let contract = Arc::new(LocalFeedbackContract::seeded(ALICE));
    let page = page(
        contract.clone(),
        WalletSession::connected(ALICE),
        "Sarah Chen",
        "Looks good",
    );

    submit_feedback(&page.form, &page.adapter, &page.thread)
        .await
        .unwrap();
    assert_eq!(contract.feedback_authors(1).unwrap(), vec![ALICE]);
    let stored = contract.feedback_payload(1).unwrap().unwrap();
    assert_eq!(
        stored.content_hash.to_string(),
        "0x0000000000000000000000000000000000000000360955469927618526015332"
    );
    assert_eq!(page.thread.len().await, 4);
}
