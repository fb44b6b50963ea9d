// Headless wallet provider over an HTTP RPC endpoint with a local signer,
// standing in for a browser-injected wallet.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::{
    network::EthereumWallet,
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use credport_core::chain::ChainDescriptor;
use credport_core::error::ConnectionError;
use credport_core::wallet::{ProviderRpcError, WalletEvent, WalletProvider};

use crate::error::ConnectorError;

pub struct RpcWalletProvider {
    provider: DynProvider,
    account: Address,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<WalletEvent>>>,
    last_chain_id: Mutex<Option<u64>>,
}

impl RpcWalletProvider {
    pub fn connect(rpc_url: &str, signer: PrivateKeySigner) -> Result<Arc<Self>, ConnectorError> {
        let account = signer.address();
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(
                rpc_url
                    .parse()
                    .map_err(|e| ConnectorError::invalid_input(format!("invalid rpc url: {e}")))?,
            );

        Ok(Arc::new(Self::from_parts(provider.erased(), account)))
    }

    pub fn from_parts(provider: DynProvider, account: Address) -> Self {
        Self {
            provider,
            account,
            subscribers: Mutex::new(Vec::new()),
            last_chain_id: Mutex::new(None),
        }
    }

    /// The underlying provider, for binding contract clients against the
    /// same signer.
    pub fn dyn_provider(&self) -> DynProvider {
        self.provider.clone()
    }

    pub fn account(&self) -> Address {
        self.account
    }

    fn publish(&self, event: WalletEvent) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    /// Mirrors the wallet's `accountsChanged` push, for drills and tests.
    pub fn inject_accounts_changed(&self, accounts: Vec<Address>) {
        self.publish(WalletEvent::AccountsChanged(accounts));
    }

    /// Mirrors the wallet's `chainChanged` push, for drills and tests.
    pub fn inject_chain_changed(&self, chain_id: u64) {
        if let Ok(mut last) = self.last_chain_id.lock() {
            *last = Some(chain_id);
        }
        self.publish(WalletEvent::ChainChanged(chain_id));
    }

    /// Polls the RPC for chain drift and publishes `ChainChanged` when the
    /// endpoint starts answering for a different chain.
    pub fn spawn_event_pump(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let this = self;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match this.provider.get_chain_id().await {
                    Ok(chain_id) => {
                        let changed = {
                            let Ok(mut last) = this.last_chain_id.lock() else {
                                continue;
                            };
                            let changed = last.is_some_and(|previous| previous != chain_id);
                            *last = Some(chain_id);
                            changed
                        };
                        if changed {
                            this.publish(WalletEvent::ChainChanged(chain_id));
                        }
                    }
                    Err(err) => debug!("chain poll failed: {err}"),
                }
            }
        })
    }
}

fn to_rpc_error(err: alloy::transports::TransportError) -> ProviderRpcError {
    match err.as_error_resp() {
        Some(payload) => ProviderRpcError::new(payload.code, payload.message.to_string()),
        None => ProviderRpcError::new(-1, err.to_string()),
    }
}

#[async_trait]
impl WalletProvider for RpcWalletProvider {
    async fn authorized_accounts(&self) -> Result<Vec<Address>, ConnectionError> {
        // The local signer is authorized by construction.
        Ok(vec![self.account])
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ConnectionError> {
        // Nothing to prompt for: access to the local signer is implicit.
        Ok(vec![self.account])
    }

    async fn chain_id(&self) -> Result<u64, ConnectionError> {
        let chain_id = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| ConnectionError::provider(e.to_string()))?;
        if let Ok(mut last) = self.last_chain_id.lock() {
            *last = Some(chain_id);
        }
        Ok(chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderRpcError> {
        let params = serde_json::json!([{ "chainId": format!("0x{chain_id:x}") }]);
        let _: serde_json::Value = self
            .provider
            .raw_request("wallet_switchEthereumChain".into(), params)
            .await
            .map_err(to_rpc_error)?;
        Ok(())
    }

    async fn add_chain(&self, chain: &ChainDescriptor) -> Result<(), ProviderRpcError> {
        let params = serde_json::json!([{
            "chainId": format!("0x{:x}", chain.chain_id),
            "chainName": chain.name,
            "nativeCurrency": {
                "name": chain.native_currency.name,
                "symbol": chain.native_currency.symbol,
                "decimals": chain.native_currency.decimals,
            },
            "rpcUrls": [chain.rpc_url],
            "blockExplorerUrls": [chain.explorer_url],
        }]);
        let _: serde_json::Value = self
            .provider
            .raw_request("wallet_addEthereumChain".into(), params)
            .await
            .map_err(to_rpc_error)?;
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<WalletEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::transports::mock::Asserter;

    fn mocked_provider() -> Arc<RpcWalletProvider> {
        let (provider, _) = mocked_provider_with_asserter();
        provider
    }

    fn mocked_provider_with_asserter() -> (Arc<RpcWalletProvider>, Asserter) {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::new()
            .connect_mocked_client(asserter.clone())
            .erased();
        let account = Address::from([0x42; 20]);
        (Arc::new(RpcWalletProvider::from_parts(provider, account)), asserter)
    }

    #[tokio::test]
    async fn both_account_reads_return_the_signer_account() {
        let provider = mocked_provider();
        let expected = vec![Address::from([0x42; 20])];

        assert_eq!(provider.authorized_accounts().await.unwrap(), expected);
        assert_eq!(provider.request_accounts().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn injected_events_reach_every_subscriber() {
        let provider = mocked_provider();
        let mut first = provider.subscribe();
        let mut second = provider.subscribe();

        provider.inject_chain_changed(137);
        provider.inject_accounts_changed(vec![]);

        assert_eq!(first.recv().await, Some(WalletEvent::ChainChanged(137)));
        assert_eq!(first.recv().await, Some(WalletEvent::AccountsChanged(vec![])));
        assert_eq!(second.recv().await, Some(WalletEvent::ChainChanged(137)));
    }

    #[tokio::test]
    async fn dropped_subscribers_are_pruned_on_publish() {
        let provider = mocked_provider();
        let first = provider.subscribe();
        let mut second = provider.subscribe();

        drop(first);
        provider.inject_chain_changed(1);

        assert_eq!(second.recv().await, Some(WalletEvent::ChainChanged(1)));
        assert_eq!(provider.subscribers.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn switch_chain_maps_the_structured_error_payload() {
        let (provider, asserter) = mocked_provider_with_asserter();
        asserter.push_failure(alloy::rpc::json_rpc::ErrorPayload {
            code: 4902,
            message: "Unrecognized chain ID".into(),
            data: None,
        });

        let err = provider.switch_chain(80002).await.unwrap_err();
        assert_eq!(err.code, 4902);
        assert!(err.unrecognized_chain());
        assert!(err.message.contains("Unrecognized chain ID"));
    }

    #[tokio::test]
    async fn chain_id_reads_through_the_rpc() {
        let (provider, asserter) = mocked_provider_with_asserter();
        asserter.push_success(&"0x13882");

        assert_eq!(provider.chain_id().await.unwrap(), 80002);
    }
}
