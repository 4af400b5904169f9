//! Call arguments for `submitFeedback`.
//!
//! The contract expects FHE ciphertexts and an input proof. None of that is
//! produced here: the content word is the content's numeric encoding written
//! in decimal and reinterpreted as hex, the rating is a plain big-endian word,
//! and the proof is all zeros. Nothing in this payload is confidential.

use alloy::primitives::{Bytes, B256, U256};

use crate::ContractError;

pub const MAX_RATING: u8 = 5;
pub const PROOF_LEN: usize = 64;

/// Number of hex characters in a 32-byte word.
const WORD_HEX_LEN: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackPayload {
    pub proposal_id: U256,
    pub content_hash: B256,
    pub rating: B256,
    pub proof: Bytes,
}

impl FeedbackPayload {
    pub fn placeholder(proposal_id: u64, content: &str, rating: u8) -> Result<Self, ContractError> {
        if proposal_id == 0 {
            return Err(ContractError::InvalidPayloadError(
                "proposal id must be positive".to_string(),
            ));
        }
        if rating > MAX_RATING {
            return Err(ContractError::InvalidPayloadError(format!(
                "rating {rating} is out of range 0..={MAX_RATING}"
            )));
        }

        let digits = content_digits(content);
        let word = hex::decode(&digits)
            .map_err(|e| ContractError::InvalidPayloadError(e.to_string()))?;

        Ok(Self {
            proposal_id: U256::from(proposal_id),
            content_hash: B256::from_slice(&word),
            rating: B256::from(U256::from(rating)),
            proof: Bytes::from(vec![0u8; PROOF_LEN]),
        })
    }
}

/// Decimal digits of the content's numeric encoding, left-padded to one word.
///
/// The UTF-8 bytes are read as a big-endian integer and reduced modulo 10^64
/// so the digits always fit into 64 characters.
pub fn content_digits(content: &str) -> String {
    let modulus = U256::from(10u64).pow(U256::from(WORD_HEX_LEN));
    let base = U256::from(256u64);
    let value = content
        .as_bytes()
        .iter()
        .fold(U256::ZERO, |acc, byte| (acc * base + U256::from(*byte)) % modulus);
    format!("{:0>width$}", value.to_string(), width = WORD_HEX_LEN)
}
