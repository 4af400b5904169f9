pub mod local_contract;
pub mod payload;
pub mod sc_contract;

use alloy::primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};

pub use payload::FeedbackPayload;

/// Remote surface of the feedback contract.
///
/// Writes resolve once the transaction has been accepted by the signer and
/// the node; they return the transaction hash and never wait for a receipt.
pub trait FeedbackContractService {
    fn register_user(
        &self,
    ) -> impl std::future::Future<Output = Result<TxHash, ContractError>> + Send;
    fn create_proposal(
        &self,
        deadline: u64,
    ) -> impl std::future::Future<Output = Result<TxHash, ContractError>> + Send;
    fn submit_feedback(
        &self,
        payload: &FeedbackPayload,
    ) -> impl std::future::Future<Output = Result<TxHash, ContractError>> + Send;
    fn close_proposal(
        &self,
        proposal_id: u64,
    ) -> impl std::future::Future<Output = Result<TxHash, ContractError>> + Send;

    fn get_user_info(
        &self,
        user: Address,
    ) -> impl std::future::Future<Output = Result<UserInfo, ContractError>> + Send;
    fn get_user_feedbacks(
        &self,
        user: Address,
    ) -> impl std::future::Future<Output = Result<Vec<u64>, ContractError>> + Send;
    fn get_proposal_info(
        &self,
        proposal_id: u64,
    ) -> impl std::future::Future<Output = Result<ProposalInfo, ContractError>> + Send;
    fn get_proposal_feedbacks(
        &self,
        proposal_id: u64,
    ) -> impl std::future::Future<Output = Result<Vec<u64>, ContractError>> + Send;
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub registered: bool,
    pub feedback_count: u64,
    pub registered_at: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalInfo {
    /// Checksummed address of the account that opened the proposal
    pub creator: String,
    pub deadline: u64,
    pub is_active: bool,
    pub feedback_count: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("User already registered")]
    AlreadyRegisteredError,
    #[error("Unknown user: {0}")]
    UnknownUserError(Address),
    #[error("Unknown proposal: {0}")]
    UnknownProposalError(u64),
    #[error("Proposal {0} is closed")]
    ProposalClosedError(u64),
    #[error("Only the proposal creator can close proposal {0}")]
    NotProposalCreatorError(u64),
    #[error("Invalid feedback payload: {0}")]
    InvalidPayloadError(String),
    #[error("Alloy contract error: {0}")]
    AlloyError(#[from] alloy::contract::Error),
    #[error("Unknown error: {0}")]
    Other(anyhow::Error),
}
