//! Wallet-guarded access to the feedback contract.
//!
//! Every write checks the wallet first and reports its outcome through the
//! session's [`Notifier`]. Errors are returned as well, so callers can keep
//! their own state consistent, but nothing here panics or retries.

use log::{debug, error, info};
use std::{
    future::Future,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use alloy::primitives::TxHash;
use whispers_contract::{
    ContractError, FeedbackContractService, FeedbackPayload, ProposalInfo, UserInfo,
};

use crate::{
    error::AdapterError,
    notification::{Notification, Notifier},
    wallet::WalletSession,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WriteAction {
    RegisterUser,
    CreateProposal,
    SubmitFeedback,
    CloseProposal,
}

impl WriteAction {
    fn connect_hint(self) -> &'static str {
        match self {
            WriteAction::RegisterUser => "Please connect your wallet to register",
            WriteAction::CreateProposal => "Please connect your wallet to create a proposal",
            WriteAction::SubmitFeedback => "Please connect your wallet to submit feedback",
            WriteAction::CloseProposal => "Please connect your wallet to close the proposal",
        }
    }

    fn success(self) -> Notification {
        match self {
            WriteAction::RegisterUser => {
                Notification::info("User Registered", "You have been successfully registered")
            }
            WriteAction::CreateProposal => Notification::info(
                "Proposal Created",
                "Your proposal has been created successfully",
            ),
            WriteAction::SubmitFeedback => Notification::info(
                "Feedback Submitted",
                "Your feedback has been submitted successfully",
            ),
            WriteAction::CloseProposal => Notification::info(
                "Proposal Closed",
                "The proposal has been closed successfully",
            ),
        }
    }

    fn failure(self) -> Notification {
        match self {
            WriteAction::RegisterUser => Notification::destructive(
                "Registration Failed",
                "Failed to register user. Please try again.",
            ),
            WriteAction::CreateProposal => Notification::destructive(
                "Proposal Creation Failed",
                "Failed to create proposal. Please try again.",
            ),
            WriteAction::SubmitFeedback => Notification::destructive(
                "Feedback Submission Failed",
                "Failed to submit feedback. Please try again.",
            ),
            WriteAction::CloseProposal => Notification::destructive(
                "Proposal Closing Failed",
                "Failed to close proposal. Please try again.",
            ),
        }
    }
}

/// Decrements the in-flight counter when the write finishes, whatever the outcome.
struct PendingGuard(Arc<AtomicUsize>);

impl PendingGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct ContractAdapter<C> {
    contract: Arc<C>,
    wallet: WalletSession,
    notifier: Notifier,
    pending: Arc<AtomicUsize>,
}

impl<C> ContractAdapter<C>
where
    C: FeedbackContractService + Send + Sync,
{
    pub fn new(contract: Arc<C>, wallet: WalletSession, notifier: Notifier) -> Self {
        Self {
            contract,
            wallet,
            notifier,
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn wallet(&self) -> &WalletSession {
        &self.wallet
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// True while at least one write issued through this adapter is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }

    pub async fn register_user(&self) -> Result<TxHash, AdapterError> {
        self.write(WriteAction::RegisterUser, || self.contract.register_user())
            .await
    }

    pub async fn create_proposal(&self, deadline: u64) -> Result<TxHash, AdapterError> {
        self.write(WriteAction::CreateProposal, || {
            self.contract.create_proposal(deadline)
        })
        .await
    }

    /// Submits feedback with the placeholder payload built from `content` and `rating`.
    pub async fn submit_feedback(
        &self,
        proposal_id: u64,
        content: &str,
        rating: u8,
    ) -> Result<TxHash, AdapterError> {
        self.write(WriteAction::SubmitFeedback, || async move {
            match FeedbackPayload::placeholder(proposal_id, content, rating) {
                Ok(payload) => self.contract.submit_feedback(&payload).await,
                Err(err) => Err(err),
            }
        })
        .await
    }

    pub async fn close_proposal(&self, proposal_id: u64) -> Result<TxHash, AdapterError> {
        self.write(WriteAction::CloseProposal, || {
            self.contract.close_proposal(proposal_id)
        })
        .await
    }

    /// Registration info of the connected account, `None` without a wallet.
    pub async fn get_user_info(&self) -> Result<Option<UserInfo>, AdapterError> {
        let Some(address) = self.wallet.address() else {
            debug!("getUserInfo skipped: no wallet address");
            return Ok(None);
        };
        Ok(Some(self.contract.get_user_info(address).await?))
    }

    /// Feedback ids submitted by the connected account, `None` without a wallet.
    pub async fn get_user_feedbacks(&self) -> Result<Option<Vec<u64>>, AdapterError> {
        let Some(address) = self.wallet.address() else {
            debug!("getUserFeedbacks skipped: no wallet address");
            return Ok(None);
        };
        Ok(Some(self.contract.get_user_feedbacks(address).await?))
    }

    pub async fn get_proposal_info(&self, proposal_id: u64) -> Result<ProposalInfo, AdapterError> {
        Ok(self.contract.get_proposal_info(proposal_id).await?)
    }

    pub async fn get_proposal_feedbacks(&self, proposal_id: u64) -> Result<Vec<u64>, AdapterError> {
        Ok(self.contract.get_proposal_feedbacks(proposal_id).await?)
    }

    async fn write<F, Fut>(&self, action: WriteAction, call: F) -> Result<TxHash, AdapterError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TxHash, ContractError>>,
    {
        if !self.wallet.is_connected() {
            self.notifier
                .notify(Notification::destructive("Wallet Not Connected", action.connect_hint()));
            return Err(AdapterError::WalletNotConnected);
        }

        let _pending = PendingGuard::enter(&self.pending);
        match call().await {
            Ok(tx_hash) => {
                info!("{action:?} accepted: {tx_hash}");
                self.notifier.notify(action.success());
                Ok(tx_hash)
            }
            Err(err) => {
                error!("{action:?} failed: {err}");
                self.notifier.notify(action.failure());
                Err(err.into())
            }
        }
    }
}
