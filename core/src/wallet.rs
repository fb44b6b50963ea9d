use alloy::primitives::Address;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::chain::ChainDescriptor;
use crate::error::ConnectionError;

/// Typed notification pushed by the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
}

/// EIP-3085: the wallet does not know the requested chain.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

/// Structured failure returned by a provider RPC request.
#[derive(Debug, Clone, Error)]
#[error("provider error {code}: {message}")]
pub struct ProviderRpcError {
    pub code: i64,
    pub message: String,
}

impl ProviderRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unrecognized_chain(&self) -> bool {
        self.code == UNRECOGNIZED_CHAIN_CODE
    }
}

/// Boundary to the external wallet. Request/response shapes beyond this
/// surface belong to the provider, not to the portal.
#[mockall::automock]
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Accounts the wallet has already authorized. Never prompts.
    async fn authorized_accounts(&self) -> Result<Vec<Address>, ConnectionError>;

    /// Requests account access. May prompt the user and may be rejected.
    async fn request_accounts(&self) -> Result<Vec<Address>, ConnectionError>;

    async fn chain_id(&self) -> Result<u64, ConnectionError>;

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderRpcError>;

    async fn add_chain(&self, chain: &ChainDescriptor) -> Result<(), ProviderRpcError>;

    /// Registers a new event subscriber. The receiver stays open for the
    /// lifetime of the provider.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<WalletEvent>;
}

/// Lower-case hex rendering used everywhere an address becomes a string.
pub fn canonical_address(address: &Address) -> String {
    format!("0x{}", alloy::hex::encode(address.as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_address_is_lower_case_hex() {
        let address: Address = "0xAbCd000000000000000000000000000000001234".parse().unwrap();
        assert_eq!(canonical_address(&address), "0xabcd000000000000000000000000000000001234");
    }

    #[test]
    fn unrecognized_chain_matches_only_4902() {
        assert!(ProviderRpcError::new(4902, "unknown chain").unrecognized_chain());
        assert!(!ProviderRpcError::new(4001, "user rejected").unrecognized_chain());
    }
}
