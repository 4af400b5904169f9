use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use clap::Parser;
use std::{net::SocketAddr, str::FromStr};
use url::Url;

use crate::{
    error::ConfigError,
    feedback_form::{DEFAULT_PROPOSAL_ID, DEFAULT_RATING},
};

#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// JSON-RPC endpoint of the chain the feedback contract lives on
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: Option<Url>,

    /// Feedback contract address
    #[arg(short = 'C', long, env = "CONTRACT_ADDRESS")]
    pub contract_address: Option<Address>,

    /// User private key that correspond to Ethereum wallet.
    /// Without it the wallet is treated as disconnected.
    #[arg(short = 'K', long, env = "PRIVATE_KEY")]
    pub private_key: Option<String>,

    #[arg(short = 'L', long, env = "LISTEN_ADDR", default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    /// Proposal the feedback form submits to
    #[arg(
        long,
        env = "PROPOSAL_ID",
        default_value_t = DEFAULT_PROPOSAL_ID,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub proposal_id: u64,

    /// Rating attached to every submitted feedback
    #[arg(
        long,
        env = "RATING",
        default_value_t = DEFAULT_RATING,
        value_parser = clap::value_parser!(u8).range(0..=5)
    )]
    pub rating: u8,

    /// Use a seeded in-memory contract instead of a chain
    #[arg(long, default_value_t = false)]
    pub offline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Offline,
    Online {
        rpc_url: Url,
        contract_address: Address,
    },
}

impl Args {
    pub fn mode(&self) -> Result<Mode, ConfigError> {
        if self.offline {
            return Ok(Mode::Offline);
        }
        let rpc_url = self.rpc_url.clone().ok_or(ConfigError::MissingRpcUrl)?;
        let contract_address = self
            .contract_address
            .ok_or(ConfigError::MissingContractAddress)?;
        Ok(Mode::Online {
            rpc_url,
            contract_address,
        })
    }

    pub fn signer(&self) -> Result<Option<PrivateKeySigner>, ConfigError> {
        match &self.private_key {
            Some(key) => Ok(Some(PrivateKeySigner::from_str(key.trim())?)),
            None => Ok(None),
        }
    }
}
