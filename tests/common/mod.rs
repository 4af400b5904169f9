use alloy::primitives::{keccak256, Address, TxHash};
use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use whispers_contract::{
    ContractError, FeedbackContractService, FeedbackPayload, ProposalInfo, UserInfo,
};

pub const ALICE: Address = alloy::primitives::address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// Contract double that records every call and can be told to reject writes.
#[derive(Debug, Default)]
pub struct FakeContract {
    pub fail_writes: AtomicBool,
    pub write_calls: AtomicUsize,
    pub read_calls: AtomicUsize,
    pub payloads: Mutex<Vec<FeedbackPayload>>,
    /// How long `submit_feedback` stays in flight
    pub submit_delay: Duration,
}

impl FakeContract {
    pub fn failing() -> Self {
        let fake = Self::default();
        fake.fail_writes.store(true, Ordering::SeqCst);
        fake
    }

    pub fn slow(submit_delay: Duration) -> Self {
        Self {
            submit_delay,
            ..Self::default()
        }
    }

    pub fn payloads(&self) -> Vec<FeedbackPayload> {
        self.payloads.lock().unwrap().clone()
    }

    pub fn writes(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub fn last_payload(&self) -> Option<FeedbackPayload> {
        self.payloads.lock().unwrap().last().cloned()
    }

    fn write(&self) -> Result<TxHash, ContractError> {
        let n = self.write_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ContractError::Other(anyhow::anyhow!("user rejected the request")));
        }
        Ok(keccak256((n as u64).to_be_bytes()))
    }
}

impl FeedbackContractService for FakeContract {
    async fn register_user(&self) -> Result<TxHash, ContractError> {
        self.write()
    }

    async fn create_proposal(&self, _deadline: u64) -> Result<TxHash, ContractError> {
        self.write()
    }

    async fn submit_feedback(&self, payload: &FeedbackPayload) -> Result<TxHash, ContractError> {
        self.payloads.lock().unwrap().push(payload.clone());
        if !self.submit_delay.is_zero() {
            tokio::time::sleep(self.submit_delay).await;
        }
        self.write()
    }

    async fn close_proposal(&self, _proposal_id: u64) -> Result<TxHash, ContractError> {
        self.write()
    }

    async fn get_user_info(&self, _user: Address) -> Result<UserInfo, ContractError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        Ok(UserInfo {
            registered: true,
            feedback_count: 2,
            registered_at: 10,
        })
    }

    async fn get_user_feedbacks(&self, _user: Address) -> Result<Vec<u64>, ContractError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![1, 2])
    }

    async fn get_proposal_info(&self, proposal_id: u64) -> Result<ProposalInfo, ContractError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if proposal_id != 1 {
            return Err(ContractError::UnknownProposalError(proposal_id));
        }
        Ok(ProposalInfo {
            creator: ALICE.to_checksum(None),
            deadline: 1_700_000_000,
            is_active: true,
            feedback_count: 2,
        })
    }

    async fn get_proposal_feedbacks(&self, _proposal_id: u64) -> Result<Vec<u64>, ContractError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![1, 2])
    }
}
