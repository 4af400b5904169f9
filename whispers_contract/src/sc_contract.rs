use alloy::{
    network::Network,
    primitives::{Address, TxHash, U256},
    providers::Provider,
    sol,
};
use log::debug;

use crate::{ContractError, FeedbackContractService, FeedbackPayload, ProposalInfo, UserInfo};

sol! {
    #[sol(rpc)]
    contract SecureWhispers {
        function registerUser() external;
        function createProposal(uint256 deadline) external returns (uint256 proposalId);
        function submitFeedback(
            uint256 proposalId,
            bytes32 contentHash,
            bytes32 rating,
            bytes calldata inputProof
        ) external returns (uint256 feedbackId);
        function closeProposal(uint256 proposalId) external;

        function getUserInfo(address user) external view returns (
            bool registered,
            uint256 feedbackCount,
            uint256 registeredAt
        );
        function getUserFeedbacks(address user) external view returns (uint256[] feedbackIds);
        function getProposalInfo(uint256 proposalId) external view returns (
            address creator,
            uint256 deadline,
            bool isActive,
            uint256 feedbackCount
        );
        function getProposalFeedbacks(uint256 proposalId) external view returns (uint256[] feedbackIds);
    }
}

/// Deployed feedback contract reached through an alloy provider.
pub struct ScFeedbackContract<P, N> {
    instance: SecureWhispers::SecureWhispersInstance<(), P, N>,
    address: Address,
}

impl<P, N> ScFeedbackContract<P, N>
where
    P: Provider<N>,
    N: Network,
{
    pub fn new(provider: P, address: Address) -> Self {
        Self {
            instance: SecureWhispers::new(address, provider),
            address,
        }
    }

    pub fn sc_address(&self) -> Address {
        self.address
    }
}

fn to_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

fn to_u64_vec(values: Vec<U256>) -> Vec<u64> {
    values.into_iter().map(to_u64).collect()
}

impl<P, N> FeedbackContractService for ScFeedbackContract<P, N>
where
    P: Provider<N>,
    N: Network,
{
    async fn register_user(&self) -> Result<TxHash, ContractError> {
        let pending = self.instance.registerUser().send().await?;
        Ok(*pending.tx_hash())
    }

    async fn create_proposal(&self, deadline: u64) -> Result<TxHash, ContractError> {
        let pending = self
            .instance
            .createProposal(U256::from(deadline))
            .send()
            .await?;
        Ok(*pending.tx_hash())
    }

    async fn submit_feedback(&self, payload: &FeedbackPayload) -> Result<TxHash, ContractError> {
        debug!(
            "submitFeedback proposal={} content={} rating={}",
            payload.proposal_id, payload.content_hash, payload.rating
        );
        let pending = self
            .instance
            .submitFeedback(
                payload.proposal_id,
                payload.content_hash,
                payload.rating,
                payload.proof.clone(),
            )
            .send()
            .await?;
        Ok(*pending.tx_hash())
    }

    async fn close_proposal(&self, proposal_id: u64) -> Result<TxHash, ContractError> {
        let pending = self
            .instance
            .closeProposal(U256::from(proposal_id))
            .send()
            .await?;
        Ok(*pending.tx_hash())
    }

    async fn get_user_info(&self, user: Address) -> Result<UserInfo, ContractError> {
        let info = self.instance.getUserInfo(user).call().await?;
        Ok(UserInfo {
            registered: info.registered,
            feedback_count: to_u64(info.feedbackCount),
            registered_at: to_u64(info.registeredAt),
        })
    }

    async fn get_user_feedbacks(&self, user: Address) -> Result<Vec<u64>, ContractError> {
        let res = self.instance.getUserFeedbacks(user).call().await?;
        Ok(to_u64_vec(res.feedbackIds))
    }

    async fn get_proposal_info(&self, proposal_id: u64) -> Result<ProposalInfo, ContractError> {
        let info = self
            .instance
            .getProposalInfo(U256::from(proposal_id))
            .call()
            .await?;
        Ok(ProposalInfo {
            creator: info.creator.to_checksum(None),
            deadline: to_u64(info.deadline),
            is_active: info.isActive,
            feedback_count: to_u64(info.feedbackCount),
        })
    }

    async fn get_proposal_feedbacks(&self, proposal_id: u64) -> Result<Vec<u64>, ContractError> {
        let res = self
            .instance
            .getProposalFeedbacks(U256::from(proposal_id))
            .call()
            .await?;
        Ok(to_u64_vec(res.feedbackIds))
    }
}
