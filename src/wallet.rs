use alloy::{primitives::Address, signers::local::PrivateKeySigner};

/// What the feedback flow may know about the wallet: whether one is
/// connected and which account it uses. Connecting is handled elsewhere.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalletSession {
    address: Option<Address>,
}

impl WalletSession {
    pub fn connected(address: Address) -> Self {
        Self {
            address: Some(address),
        }
    }

    pub fn disconnected() -> Self {
        Self { address: None }
    }

    pub fn from_signer(signer: Option<&PrivateKeySigner>) -> Self {
        Self {
            address: signer.map(|s| s.address()),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    pub fn address(&self) -> Option<Address> {
        self.address
    }

    /// Checksummed address for display, if connected.
    pub fn address_string(&self) -> Option<String> {
        self.address.map(|a| a.to_checksum(None))
    }
}
