use alloy::primitives::{keccak256, Address, TxHash};
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use crate::{ContractError, FeedbackContractService, FeedbackPayload, ProposalInfo, UserInfo};

#[derive(Debug)]
struct Proposal {
    creator: Address,
    deadline: u64,
    is_active: bool,
    feedbacks: Vec<u64>,
}

#[derive(Debug)]
struct StoredFeedback {
    payload: FeedbackPayload,
    author: Address,
}

#[derive(Debug, Default)]
struct Ledger {
    /// Incremented on every accepted write, doubles as the block height
    nonce: u64,
    users: HashMap<Address, UserInfo>,
    user_feedbacks: HashMap<Address, Vec<u64>>,
    proposals: HashMap<u64, Proposal>,
    feedbacks: Vec<StoredFeedback>,
}

impl Ledger {
    fn next_tx(&mut self) -> TxHash {
        self.nonce += 1;
        keccak256(self.nonce.to_be_bytes())
    }
}

/// In-memory ledger that applies every write as a single fixed sender.
#[derive(Debug)]
pub struct LocalFeedbackContract {
    sender: Address,
    ledger: Mutex<Ledger>,
}

impl LocalFeedbackContract {
    pub fn new(sender: Address) -> Self {
        Self {
            sender,
            ledger: Mutex::new(Ledger::default()),
        }
    }

    /// Ledger with `sender` registered and proposal 1 open.
    pub fn seeded(sender: Address) -> Self {
        let contract = Self::new(sender);
        if let Ok(mut ledger) = contract.ledger.lock() {
            ledger.nonce = 1;
            ledger.users.insert(
                sender,
                UserInfo {
                    registered: true,
                    feedback_count: 0,
                    registered_at: 1,
                },
            );
            ledger.proposals.insert(
                1,
                Proposal {
                    creator: sender,
                    deadline: u64::MAX,
                    is_active: true,
                    feedbacks: Vec::new(),
                },
            );
        }
        contract
    }

    pub fn sender(&self) -> Address {
        self.sender
    }

    /// Authors of the feedbacks stored for a proposal, oldest first.
    pub fn feedback_authors(&self, proposal_id: u64) -> Result<Vec<Address>, ContractError> {
        let ledger = self.lock()?;
        let proposal = ledger
            .proposals
            .get(&proposal_id)
            .ok_or(ContractError::UnknownProposalError(proposal_id))?;
        Ok(proposal
            .feedbacks
            .iter()
            .filter_map(|id| ledger.feedbacks.get(*id as usize - 1))
            .map(|f| f.author)
            .collect())
    }

    /// Payload stored for feedback `feedback_id` (ids start at 1).
    pub fn feedback_payload(&self, feedback_id: u64) -> Result<Option<FeedbackPayload>, ContractError> {
        let ledger = self.lock()?;
        let index = match feedback_id.checked_sub(1) {
            Some(index) => index as usize,
            None => return Ok(None),
        };
        Ok(ledger.feedbacks.get(index).map(|f| f.payload.clone()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Ledger>, ContractError> {
        self.ledger
            .lock()
            .map_err(|_| ContractError::Other(anyhow::anyhow!("local ledger lock poisoned")))
    }
}

impl FeedbackContractService for LocalFeedbackContract {
    async fn register_user(&self) -> Result<TxHash, ContractError> {
        let mut ledger = self.lock()?;
        if ledger.users.contains_key(&self.sender) {
            return Err(ContractError::AlreadyRegisteredError);
        }
        let tx = ledger.next_tx();
        let registered_at = ledger.nonce;
        ledger.users.insert(
            self.sender,
            UserInfo {
                registered: true,
                feedback_count: 0,
                registered_at,
            },
        );
        Ok(tx)
    }

    async fn create_proposal(&self, deadline: u64) -> Result<TxHash, ContractError> {
        let mut ledger = self.lock()?;
        let proposal_id = ledger.proposals.len() as u64 + 1;
        let tx = ledger.next_tx();
        ledger.proposals.insert(
            proposal_id,
            Proposal {
                creator: self.sender,
                deadline,
                is_active: true,
                feedbacks: Vec::new(),
            },
        );
        Ok(tx)
    }

    async fn submit_feedback(&self, payload: &FeedbackPayload) -> Result<TxHash, ContractError> {
        let proposal_id = u64::try_from(payload.proposal_id).map_err(|_| {
            ContractError::InvalidPayloadError(format!(
                "proposal id {} does not fit in 64 bits",
                payload.proposal_id
            ))
        })?;

        let mut ledger = self.lock()?;
        if !ledger.users.contains_key(&self.sender) {
            return Err(ContractError::UnknownUserError(self.sender));
        }
        match ledger.proposals.get(&proposal_id) {
            None => return Err(ContractError::UnknownProposalError(proposal_id)),
            Some(p) if !p.is_active => return Err(ContractError::ProposalClosedError(proposal_id)),
            Some(_) => {}
        }

        let tx = ledger.next_tx();
        ledger.feedbacks.push(StoredFeedback {
            payload: payload.clone(),
            author: self.sender,
        });
        let feedback_id = ledger.feedbacks.len() as u64;

        if let Some(proposal) = ledger.proposals.get_mut(&proposal_id) {
            proposal.feedbacks.push(feedback_id);
        }
        if let Some(user) = ledger.users.get_mut(&self.sender) {
            user.feedback_count += 1;
        }
        ledger
            .user_feedbacks
            .entry(self.sender)
            .or_default()
            .push(feedback_id);
        Ok(tx)
    }

    async fn close_proposal(&self, proposal_id: u64) -> Result<TxHash, ContractError> {
        let mut ledger = self.lock()?;
        let sender = self.sender;
        let proposal = ledger
            .proposals
            .get(&proposal_id)
            .ok_or(ContractError::UnknownProposalError(proposal_id))?;
        if proposal.creator != sender {
            return Err(ContractError::NotProposalCreatorError(proposal_id));
        }
        if !proposal.is_active {
            return Err(ContractError::ProposalClosedError(proposal_id));
        }

        let tx = ledger.next_tx();
        if let Some(proposal) = ledger.proposals.get_mut(&proposal_id) {
            proposal.is_active = false;
        }
        Ok(tx)
    }

    async fn get_user_info(&self, user: Address) -> Result<UserInfo, ContractError> {
        let ledger = self.lock()?;
        ledger
            .users
            .get(&user)
            .cloned()
            .ok_or(ContractError::UnknownUserError(user))
    }

    async fn get_user_feedbacks(&self, user: Address) -> Result<Vec<u64>, ContractError> {
        let ledger = self.lock()?;
        if !ledger.users.contains_key(&user) {
            return Err(ContractError::UnknownUserError(user));
        }
        Ok(ledger.user_feedbacks.get(&user).cloned().unwrap_or_default())
    }

    async fn get_proposal_info(&self, proposal_id: u64) -> Result<ProposalInfo, ContractError> {
        let ledger = self.lock()?;
        let proposal = ledger
            .proposals
            .get(&proposal_id)
            .ok_or(ContractError::UnknownProposalError(proposal_id))?;
        Ok(ProposalInfo {
            creator: proposal.creator.to_checksum(None),
            deadline: proposal.deadline,
            is_active: proposal.is_active,
            feedback_count: proposal.feedbacks.len() as u64,
        })
    }

    async fn get_proposal_feedbacks(&self, proposal_id: u64) -> Result<Vec<u64>, ContractError> {
        let ledger = self.lock()?;
        ledger
            .proposals
            .get(&proposal_id)
            .map(|p| p.feedbacks.clone())
            .ok_or(ContractError::UnknownProposalError(proposal_id))
    }
}
