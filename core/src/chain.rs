use serde::Serialize;

use crate::error::NetworkSwitchError;
use crate::wallet::WalletProvider;

/// The single chain the credential registry is deployed on.
pub const REQUIRED_CHAIN_ID: u64 = 80002;

#[derive(Debug, Clone, Serialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Descriptor handed to the wallet when it does not know the required
/// chain yet (EIP-3085 `wallet_addEthereumChain`).
#[derive(Debug, Clone, Serialize)]
pub struct ChainDescriptor {
    pub chain_id: u64,
    pub name: String,
    pub native_currency: NativeCurrency,
    pub rpc_url: String,
    pub explorer_url: String,
}

pub fn required_chain() -> ChainDescriptor {
    ChainDescriptor {
        chain_id: REQUIRED_CHAIN_ID,
        name: "Polygon Amoy".to_string(),
        native_currency: NativeCurrency {
            name: "POL".to_string(),
            symbol: "POL".to_string(),
            decimals: 18,
        },
        rpc_url: "https://rpc-amoy.polygon.technology".to_string(),
        explorer_url: "https://amoy.polygonscan.com".to_string(),
    }
}

/// Display name for a chain id.
pub fn network_name(chain_id: u64) -> String {
    match chain_id {
        1 => "Ethereum Mainnet".to_string(),
        137 => "Polygon".to_string(),
        11155111 => "Sepolia".to_string(),
        80002 => "Polygon Amoy".to_string(),
        other => format!("chain {other}"),
    }
}

/// Asks the wallet to switch to the required chain, registering it first
/// when the wallet reports it as unknown. No automatic retry beyond the
/// single add-then-switch fallback.
pub async fn switch_to_required_network(provider: &dyn WalletProvider) -> Result<(), NetworkSwitchError> {
    match provider.switch_chain(REQUIRED_CHAIN_ID).await {
        Ok(()) => Ok(()),
        Err(err) if err.unrecognized_chain() => {
            let chain = required_chain();
            provider.add_chain(&chain).await.map_err(NetworkSwitchError::add_chain)?;
            provider
                .switch_chain(REQUIRED_CHAIN_ID)
                .await
                .map_err(NetworkSwitchError::switch)
        }
        Err(err) => Err(NetworkSwitchError::switch(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::{MockWalletProvider, ProviderRpcError, UNRECOGNIZED_CHAIN_CODE};

    #[tokio::test]
    async fn switch_succeeds_directly() {
        let mut provider = MockWalletProvider::new();
        provider
            .expect_switch_chain()
            .withf(|chain_id| *chain_id == REQUIRED_CHAIN_ID)
            .times(1)
            .returning(|_| Ok(()));

        switch_to_required_network(&provider).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_chain_is_registered_then_switched() {
        let mut provider = MockWalletProvider::new();
        let mut attempts = 0;
        provider.expect_switch_chain().times(2).returning(move |_| {
            attempts += 1;
            if attempts == 1 {
                Err(ProviderRpcError::new(UNRECOGNIZED_CHAIN_CODE, "unknown chain"))
            } else {
                Ok(())
            }
        });
        provider
            .expect_add_chain()
            .withf(|chain| chain.chain_id == REQUIRED_CHAIN_ID)
            .times(1)
            .returning(|_| Ok(()));

        switch_to_required_network(&provider).await.unwrap();
    }

    #[tokio::test]
    async fn rejected_switch_is_not_retried() {
        let mut provider = MockWalletProvider::new();
        provider
            .expect_switch_chain()
            .times(1)
            .returning(|_| Err(ProviderRpcError::new(4001, "user rejected the request")));

        let err = switch_to_required_network(&provider).await.unwrap_err();
        assert!(matches!(err, NetworkSwitchError::SwitchRejected { .. }));
    }

    #[tokio::test]
    async fn add_chain_rejection_surfaces() {
        let mut provider = MockWalletProvider::new();
        provider
            .expect_switch_chain()
            .times(1)
            .returning(|_| Err(ProviderRpcError::new(UNRECOGNIZED_CHAIN_CODE, "unknown chain")));
        provider
            .expect_add_chain()
            .times(1)
            .returning(|_| Err(ProviderRpcError::new(4001, "user rejected the request")));

        let err = switch_to_required_network(&provider).await.unwrap_err();
        assert!(matches!(err, NetworkSwitchError::AddChainRejected { .. }));
    }
}
