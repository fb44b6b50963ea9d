use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;

use credential_registry_client::RegistryClient;
use credport_core::contract::{ContractBinder, CredentialContract};
use credport_core::error::ConnectionError;

use crate::provider::RpcWalletProvider;

/// Binds the fixed registry address against the wallet provider's signer.
pub struct RegistryBinder {
    provider: Arc<RpcWalletProvider>,
    registry: Address,
}

impl RegistryBinder {
    pub fn new(provider: Arc<RpcWalletProvider>, registry: Address) -> Self {
        Self { provider, registry }
    }
}

#[async_trait]
impl ContractBinder for RegistryBinder {
    async fn bind(&self) -> Result<Arc<dyn CredentialContract>, ConnectionError> {
        Ok(Arc::new(RegistryClient::new(self.registry, self.provider.dyn_provider())))
    }
}
