//! Feedback submission flow.
//!
//! # States
//!
//! - **Idle**: fields are editable, a submit may start
//! - **Validating**: a submit started, preconditions are being checked
//! - **Submitting**: the contract call is in flight, fields and submit are locked
//!
//! # State Transitions
//!
//! ```text
//! Idle -- begin_submit() --> Validating
//! Validating -- checks fail --> Idle (input kept)
//! Validating -- checks pass --> Submitting
//! Submitting -- finish_submit(true) --> Idle (input cleared)
//! Submitting -- finish_submit(false) --> Idle (input kept for retry)
//! ```
//!
//! A `begin_submit()` while `Submitting` is refused, so one form never has two
//! submissions in flight.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tokio::sync::Mutex;

use whispers_contract::FeedbackContractService;

use crate::{
    adapter::ContractAdapter,
    comment::{Comment, SharedThread},
    error::FormError,
    notification::{Notification, Notifier},
};

pub const DEFAULT_PROPOSAL_ID: u64 = 1;
pub const DEFAULT_RATING: u8 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormState {
    Idle,
    Validating,
    Submitting,
}

impl Display for FormState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self {
            FormState::Idle => "Idle",
            FormState::Validating => "Validating",
            FormState::Submitting => "Submitting",
        };
        write!(f, "{state}")
    }
}

/// Validated form input, trimmed and non-empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackSubmission {
    pub author: String,
    pub content: String,
}

impl FeedbackSubmission {
    pub fn new(author: &str, content: &str) -> Result<Self, FormError> {
        let author = author.trim();
        let content = content.trim();
        if author.is_empty() || content.is_empty() {
            return Err(FormError::IncompleteInformation);
        }
        Ok(Self {
            author: author.to_string(),
            content: content.to_string(),
        })
    }
}

/// What a client needs to redraw the form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSnapshot {
    pub author: String,
    pub content: String,
    pub state: FormState,
    pub can_submit: bool,
}

#[derive(Debug, Clone)]
pub struct FeedbackForm {
    author: String,
    content: String,
    state: FormState,
    proposal_id: u64,
    rating: u8,
}

impl Default for FeedbackForm {
    fn default() -> Self {
        Self::new(DEFAULT_PROPOSAL_ID, DEFAULT_RATING)
    }
}

impl FeedbackForm {
    pub fn new(proposal_id: u64, rating: u8) -> Self {
        Self {
            author: String::new(),
            content: String::new(),
            state: FormState::Idle,
            proposal_id,
            rating,
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn proposal_id(&self) -> u64 {
        self.proposal_id
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    /// Returns false and leaves the field untouched while submitting.
    pub fn set_author(&mut self, author: &str) -> bool {
        if self.state == FormState::Submitting {
            return false;
        }
        self.author = author.to_string();
        true
    }

    /// Returns false and leaves the field untouched while submitting.
    pub fn set_content(&mut self, content: &str) -> bool {
        if self.state == FormState::Submitting {
            return false;
        }
        self.content = content.to_string();
        true
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self, wallet_connected: bool, adapter_pending: bool) -> bool {
        wallet_connected
            && self.state == FormState::Idle
            && !adapter_pending
            && !self.author.trim().is_empty()
            && !self.content.trim().is_empty()
    }

    pub fn snapshot(&self, wallet_connected: bool, adapter_pending: bool) -> FormSnapshot {
        FormSnapshot {
            author: self.author.clone(),
            content: self.content.clone(),
            state: self.state,
            can_submit: self.can_submit(wallet_connected, adapter_pending),
        }
    }

    /// Starts a submission. On success the form is `Submitting` and the
    /// trimmed input is returned; on rejection it is back to `Idle`.
    pub fn begin_submit(&mut self, wallet_connected: bool) -> Result<FeedbackSubmission, FormError> {
        if self.state != FormState::Idle {
            return Err(FormError::AlreadySubmitting);
        }
        self.transition(FormState::Validating);

        let checked = if wallet_connected {
            FeedbackSubmission::new(&self.author, &self.content)
        } else {
            Err(FormError::WalletNotConnected)
        };

        match checked {
            Ok(submission) => {
                self.transition(FormState::Submitting);
                Ok(submission)
            }
            Err(err) => {
                debug!("Feedback rejected before submission: {err}");
                self.transition(FormState::Idle);
                Err(err)
            }
        }
    }

    /// Replaces both fields and starts a submission in one step, so the input
    /// that gets validated is the input that was just typed. While another
    /// submission is in flight the fields are left untouched.
    pub fn begin_submit_with(
        &mut self,
        author: &str,
        content: &str,
        wallet_connected: bool,
    ) -> Result<FeedbackSubmission, FormError> {
        if self.state != FormState::Idle {
            return Err(FormError::AlreadySubmitting);
        }
        self.author = author.to_string();
        self.content = content.to_string();
        self.begin_submit(wallet_connected)
    }

    /// Ends the in-flight submission. Input is cleared only when it went through.
    pub fn finish_submit(&mut self, succeeded: bool) {
        if self.state != FormState::Submitting {
            return;
        }
        if succeeded {
            self.author.clear();
            self.content.clear();
        }
        self.transition(FormState::Idle);
    }

    fn transition(&mut self, next: FormState) {
        debug!("Feedback form: {} -> {}", self.state, next);
        self.state = next;
    }
}

fn notify_rejection(notifier: &Notifier, err: &FormError) {
    match err {
        FormError::WalletNotConnected => notifier.notify(Notification::destructive(
            "Wallet Not Connected",
            "Please connect your wallet to submit feedback",
        )),
        FormError::IncompleteInformation => notifier.notify(Notification::destructive(
            "Incomplete Information",
            "Please provide your name and feedback content",
        )),
        FormError::AlreadySubmitting | FormError::SubmissionFailed(_) => {}
    }
}

/// Runs one submission of `form` end to end, with whatever it currently holds.
///
/// The form lock is released while the contract call is in flight; the
/// `Submitting` state keeps a second submit of the same form out meanwhile.
/// The thread only grows when the contract accepted the feedback.
pub async fn submit_feedback<C>(
    form: &Mutex<FeedbackForm>,
    adapter: &ContractAdapter<C>,
    thread: &SharedThread,
) -> Result<Comment, FormError>
where
    C: FeedbackContractService + Send + Sync,
{
    let connected = adapter.wallet().is_connected();
    let started = form.lock().await.begin_submit(connected);
    run_submission(form, adapter, thread, started).await
}

/// Same as [`submit_feedback`], but the form is filled with `author` and
/// `content` under the same lock that starts the submission.
pub async fn submit_typed_feedback<C>(
    form: &Mutex<FeedbackForm>,
    adapter: &ContractAdapter<C>,
    thread: &SharedThread,
    author: &str,
    content: &str,
) -> Result<Comment, FormError>
where
    C: FeedbackContractService + Send + Sync,
{
    let connected = adapter.wallet().is_connected();
    let started = form
        .lock()
        .await
        .begin_submit_with(author, content, connected);
    run_submission(form, adapter, thread, started).await
}

async fn run_submission<C>(
    form: &Mutex<FeedbackForm>,
    adapter: &ContractAdapter<C>,
    thread: &SharedThread,
    started: Result<FeedbackSubmission, FormError>,
) -> Result<Comment, FormError>
where
    C: FeedbackContractService + Send + Sync,
{
    let submission = match started {
        Ok(submission) => submission,
        Err(err) => {
            notify_rejection(adapter.notifier(), &err);
            return Err(err);
        }
    };
    let (proposal_id, rating) = {
        let form = form.lock().await;
        (form.proposal_id(), form.rating())
    };

    match adapter
        .submit_feedback(proposal_id, &submission.content, rating)
        .await
    {
        Ok(tx_hash) => {
            let comment = thread
                .append_feedback(&submission.author, &submission.content)
                .await;
            form.lock().await.finish_submit(true);
            info!("Feedback {} from {} sent in {tx_hash}", comment.id, comment.author);
            adapter.notifier().notify(Notification::info(
                "Feedback Encrypted & Sent",
                "Your feedback has been securely encrypted and submitted to the blockchain",
            ));
            Ok(comment)
        }
        Err(err) => {
            form.lock().await.finish_submit(false);
            adapter.notifier().notify(Notification::destructive(
                "Submission Error",
                "Failed to submit feedback. Please try again.",
            ));
            Err(err.into())
        }
    }
}
