use alloy::signers::local::LocalSignerError;
use whispers_contract::ContractError;

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("Wallet not connected")]
    WalletNotConnected,
    #[error(transparent)]
    ContractError(#[from] ContractError),
}

/// Reasons a feedback submission does not reach the contract or fails there.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("Wallet not connected")]
    WalletNotConnected,
    #[error("Author and feedback content are required")]
    IncompleteInformation,
    #[error("A submission is already in progress")]
    AlreadySubmitting,
    #[error("Submission failed: {0}")]
    SubmissionFailed(#[from] AdapterError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("RPC url is required unless --offline is set")]
    MissingRpcUrl,
    #[error("Contract address is required unless --offline is set")]
    MissingContractAddress,
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(#[from] LocalSignerError),
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind listener: {0}")]
    BindError(String),
    #[error("Server stopped with error: {0}")]
    ServeError(String),
    #[error("JSON processing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Failed to send message to websocket: {0}")]
    SendMessageError(#[from] axum::Error),
}
