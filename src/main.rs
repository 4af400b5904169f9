use alloy::{
    network::{Ethereum, EthereumWallet},
    providers::ProviderBuilder,
    signers::local::PrivateKeySigner,
};
use anyhow::Context;
use clap::Parser;
use log::info;
use std::sync::Arc;

use secure_whispers::{
    config::{Args, Mode},
    server::{self, AppState},
    WalletSession,
};
use whispers_contract::{
    local_contract::LocalFeedbackContract, sc_contract::ScFeedbackContract,
    FeedbackContractService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let signer = args.signer()?;

    match args.mode()? {
        Mode::Offline => {
            // Offline the wallet is always connected, with a throwaway key if none is given
            let signer = signer.unwrap_or_else(PrivateKeySigner::random);
            let wallet = WalletSession::from_signer(Some(&signer));
            let contract = LocalFeedbackContract::seeded(signer.address());
            info!("Offline mode, acting as {}", contract.sender());
            run(&args, wallet, contract).await
        }
        Mode::Online {
            rpc_url,
            contract_address,
        } => {
            info!("Using feedback contract {contract_address} at {rpc_url}");
            let wallet = WalletSession::from_signer(signer.as_ref());
            match signer {
                Some(signer) => {
                    let provider = ProviderBuilder::new()
                        .wallet(EthereumWallet::from(signer))
                        .on_http(rpc_url);
                    let contract =
                        ScFeedbackContract::<_, Ethereum>::new(provider, contract_address);
                    run(&args, wallet, contract).await
                }
                None => {
                    info!("No private key configured, wallet is disconnected");
                    let provider = ProviderBuilder::new().on_http(rpc_url);
                    let contract =
                        ScFeedbackContract::<_, Ethereum>::new(provider, contract_address);
                    run(&args, wallet, contract).await
                }
            }
        }
    }
}

async fn run<C>(args: &Args, wallet: WalletSession, contract: C) -> anyhow::Result<()>
where
    C: FeedbackContractService + Send + Sync + 'static,
{
    let state = Arc::new(AppState::new(
        contract,
        wallet,
        args.proposal_id,
        args.rating,
    ));
    let (_, server) = server::bind(args.listen, state)?;
    server.await.context("server task panicked")??;
    Ok(())
}
