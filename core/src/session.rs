use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::chain::{self, REQUIRED_CHAIN_ID};
use crate::contract::{ContractBinder, CredentialContract};
use crate::error::{ConnectionError, ContractCallError};
use crate::wallet::{WalletEvent, WalletProvider, canonical_address};

/// Value copy of the session state for screens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub address: Option<Address>,
    pub chain_id: Option<u64>,
    pub network_name: Option<String>,
    pub contract_bound: bool,
}

impl SessionSnapshot {
    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    /// Derived on demand from `chain_id`, never stored independently.
    pub fn is_correct_network(&self) -> bool {
        self.chain_id == Some(REQUIRED_CHAIN_ID)
    }
}

/// Outcome of applying one wallet event, for the reconciliation loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    /// The wallet removed all accounts; local state was cleared.
    Disconnected,
    /// The wallet reported an active account, possibly a new one.
    Connected(Address),
    /// The active chain changed. The contract binding's execution context
    /// is invalid and the application must fully reload.
    ReloadRequired { chain_id: u64 },
}

/// Live binding to a wallet and chain. Owned by the application and
/// handed `&mut` to the single reconciliation loop; there is no shared
/// mutable state behind it.
pub struct ChainSession {
    provider: Option<Arc<dyn WalletProvider>>,
    binder: Arc<dyn ContractBinder>,
    events: Option<mpsc::UnboundedReceiver<WalletEvent>>,
    address: Option<Address>,
    chain_id: Option<u64>,
    network_name: Option<String>,
    contract: Option<Arc<dyn CredentialContract>>,
}

impl ChainSession {
    pub fn new(provider: Option<Arc<dyn WalletProvider>>, binder: Arc<dyn ContractBinder>) -> Self {
        Self {
            provider,
            binder,
            events: None,
            address: None,
            chain_id: None,
            network_name: None,
            contract: None,
        }
    }

    /// Detects the provider and silently restores an already-authorized
    /// session. Absence of a provider is not an error; screens treat a
    /// `None` address as "not connected".
    ///
    /// Subscribes to provider events exactly once; re-initialization after
    /// a reload keeps the existing subscription.
    pub async fn initialize(&mut self) -> Result<(), ConnectionError> {
        let Some(provider) = self.provider.clone() else {
            debug!("no wallet provider detected; session stays disconnected");
            return Ok(());
        };

        if self.events.is_none() {
            self.events = Some(provider.subscribe());
        }

        let chain_id = provider.chain_id().await?;
        self.chain_id = Some(chain_id);
        self.network_name = Some(chain::network_name(chain_id));

        let accounts = provider.authorized_accounts().await?;
        if let Some(first) = accounts.first() {
            self.adopt(*first, chain_id);
            self.bind_contract().await;
            info!(address = %canonical_address(first), "restored authorized wallet session");
        }

        Ok(())
    }

    /// Requests account access from the wallet. Re-entrant: connecting
    /// while connected re-validates against the provider instead of
    /// duplicating state. On failure prior state is left intact.
    pub async fn connect(&mut self) -> Result<Address, ConnectionError> {
        let provider = self.provider.clone().ok_or(ConnectionError::ProviderUnavailable)?;

        let accounts = provider.request_accounts().await?;
        let first = accounts
            .first()
            .copied()
            .ok_or_else(|| ConnectionError::rejected("wallet granted no accounts"))?;
        let chain_id = provider.chain_id().await?;

        self.adopt(first, chain_id);
        self.bind_contract().await;
        info!(address = %canonical_address(&first), chain_id, "wallet connected");
        Ok(first)
    }

    /// Clears the session's own handles. Local-state-only: no provider
    /// API exists to revoke the wallet's authorization, so a later
    /// `initialize()` may silently restore the session. The chain
    /// identity is retained.
    pub fn disconnect(&mut self) {
        self.address = None;
        self.contract = None;
    }

    /// Applies one provider event. Every mutation is a full overwrite
    /// from the latest observed truth, so a stale resumption racing a
    /// user action resolves as last-event-wins.
    pub async fn apply_event(&mut self, event: WalletEvent) -> Result<SessionChange, ConnectionError> {
        match event {
            WalletEvent::AccountsChanged(accounts) => match accounts.first() {
                None => {
                    self.disconnect();
                    info!("wallet removed all accounts; session disconnected");
                    Ok(SessionChange::Disconnected)
                }
                Some(first) => {
                    let provider = self.provider.clone().ok_or(ConnectionError::ProviderUnavailable)?;
                    let chain_id = provider.chain_id().await?;
                    self.adopt(*first, chain_id);
                    self.bind_contract().await;
                    Ok(SessionChange::Connected(*first))
                }
            },
            WalletEvent::ChainChanged(chain_id) => {
                // A chain switch invalidates the bound contract's execution
                // context; clear immediately and reload instead of patching.
                self.address = None;
                self.contract = None;
                self.chain_id = Some(chain_id);
                self.network_name = Some(chain::network_name(chain_id));
                info!(chain_id, "chain changed; requesting full reload");
                Ok(SessionChange::ReloadRequired { chain_id })
            }
        }
    }

    /// Next provider event for the reconciliation loop. `None` when the
    /// provider is gone or its channel closed.
    pub async fn next_event(&mut self) -> Option<WalletEvent> {
        match &mut self.events {
            Some(events) => events.recv().await,
            None => None,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            address: self.address,
            chain_id: self.chain_id,
            network_name: self.network_name.clone(),
            contract_bound: self.contract.is_some(),
        }
    }

    pub fn address(&self) -> Option<Address> {
        self.address
    }

    pub fn provider(&self) -> Option<Arc<dyn WalletProvider>> {
        self.provider.clone()
    }

    /// The bound contract handle. Callers must treat `NotBound` as "wrong
    /// network or not connected", not as a fault.
    pub fn contract(&self) -> Result<Arc<dyn CredentialContract>, ContractCallError> {
        self.contract.clone().ok_or(ContractCallError::NotBound)
    }

    fn adopt(&mut self, address: Address, chain_id: u64) {
        self.address = Some(address);
        self.chain_id = Some(chain_id);
        self.network_name = Some(chain::network_name(chain_id));
    }

    /// Network gating: a handle exists only with an address on the
    /// required chain.
    async fn bind_contract(&mut self) {
        self.contract = None;
        if self.address.is_some() && self.chain_id == Some(REQUIRED_CHAIN_ID) {
            match self.binder.bind().await {
                Ok(contract) => self.contract = Some(contract),
                Err(err) => warn!("contract binding failed: {err}"),
            }
        }
    }
}
