use std::sync::Arc;

use async_trait::async_trait;

use credport_connectors::binder::RegistryBinder;
use credport_connectors::provider::RpcWalletProvider;
use credport_connectors::resume::HttpResumeGenerator;
use credport_connectors::store::JsonIdentityStore;
use credport_core::contract::{ContractBinder, CredentialContract};
use credport_core::error::ConnectionError;
use credport_core::identity::{IdentityService, IdentityStore};
use credport_core::resume::ResumeGenerator;
use credport_core::session::ChainSession;
use credport_core::wallet::WalletProvider;

use crate::config::Config;
use crate::error::PortalError;
use crate::notifications::PortalNotifier;
use crate::notifications::telegram::telegram_notifier_from_env;

/// Everything a command needs: the owned session, the identity service
/// bound to the persistent store, and the outward collaborators.
pub struct PortalContext {
    pub config: Arc<Config>,
    pub provider: Option<Arc<RpcWalletProvider>>,
    pub session: ChainSession,
    pub identity: IdentityService,
    pub notifier: Arc<dyn PortalNotifier>,
    pub resume: Option<Arc<dyn ResumeGenerator>>,
}

/// Binder used when no wallet provider is available; the session never
/// reaches it because binding requires an address.
struct DisconnectedBinder;

#[async_trait]
impl ContractBinder for DisconnectedBinder {
    async fn bind(&self) -> Result<Arc<dyn CredentialContract>, ConnectionError> {
        Err(ConnectionError::ProviderUnavailable)
    }
}

pub struct PortalContextBuilder {
    config: Arc<Config>,
    provider: Option<Arc<RpcWalletProvider>>,
    store: Option<Arc<dyn IdentityStore>>,
    notifier: Option<Arc<dyn PortalNotifier>>,
}

impl PortalContextBuilder {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            provider: None,
            store: None,
            notifier: None,
        }
    }

    pub fn with_provider(mut self, provider: Arc<RpcWalletProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn IdentityStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn PortalNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub async fn build(self) -> Result<PortalContext, PortalError> {
        let config = self.config;

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(JsonIdentityStore::new(config.identity_store_path.clone())));
        let identity = IdentityService::load(store).await?;

        let (session_provider, binder): (Option<Arc<dyn WalletProvider>>, Arc<dyn ContractBinder>) =
            match &self.provider {
                Some(provider) => (
                    Some(provider.clone()),
                    Arc::new(RegistryBinder::new(provider.clone(), config.registry_address)),
                ),
                None => (None, Arc::new(DisconnectedBinder)),
            };
        let session = ChainSession::new(session_provider, binder);

        let notifier = self.notifier.unwrap_or_else(telegram_notifier_from_env);
        let resume: Option<Arc<dyn ResumeGenerator>> = config
            .resume_url
            .as_ref()
            .map(|url| Arc::new(HttpResumeGenerator::new(url.clone())) as Arc<dyn ResumeGenerator>);

        Ok(PortalContext {
            config,
            provider: self.provider,
            session,
            identity,
            notifier,
            resume,
        })
    }
}

/// Builds the context from env-driven config, attaching the wallet
/// provider only when a signer key is configured.
pub async fn init_context() -> Result<PortalContext, PortalError> {
    let config = Config::load()?;
    let mut builder = PortalContextBuilder::new(config.clone());

    if let Some(signer) = config.wallet_key.clone() {
        let provider = RpcWalletProvider::connect(&config.rpc_url, signer)?;
        builder = builder.with_provider(provider);
    }

    builder.build().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use credport_core::identity::{AccountType, MockIdentityStore, UserIdentity};
    use credport_core::session::SessionSnapshot;
    use std::path::PathBuf;

    use crate::notifications::noop_portal_notifier;

    fn test_config() -> Arc<Config> {
        Arc::new(Config {
            rpc_url: "http://localhost:8545".to_string(),
            wallet_key: None,
            registry_address: Address::ZERO,
            identity_store_path: PathBuf::from("/tmp/credport-test/identity.json"),
            resume_url: None,
            chain_poll_secs: 15,
        })
    }

    #[tokio::test]
    async fn build_without_provider_yields_disconnected_session() {
        let mut store = MockIdentityStore::new();
        store.expect_load().returning(|| Ok(None));

        let mut ctx = PortalContextBuilder::new(test_config())
            .with_store(Arc::new(store))
            .with_notifier(noop_portal_notifier())
            .build()
            .await
            .unwrap();

        assert!(ctx.provider.is_none());
        assert!(ctx.resume.is_none());
        assert!(ctx.identity.active().is_none());

        // provider absence is not an error; the session just stays empty
        ctx.session.initialize().await.unwrap();
        assert_eq!(ctx.session.snapshot(), SessionSnapshot::default());
    }

    #[tokio::test]
    async fn build_restores_the_persisted_identity() {
        let mut store = MockIdentityStore::new();
        store.expect_load().returning(|| {
            Ok(Some(UserIdentity {
                id: "erin@example.org".to_string(),
                name: "erin".to_string(),
                email: Some("erin@example.org".to_string()),
                account_type: AccountType::Student,
                wallet_address: None,
            }))
        });

        let ctx = PortalContextBuilder::new(test_config())
            .with_store(Arc::new(store))
            .with_notifier(noop_portal_notifier())
            .build()
            .await
            .unwrap();

        assert_eq!(ctx.identity.active().unwrap().id, "erin@example.org");
    }

    #[tokio::test]
    async fn disconnected_binder_reports_provider_unavailable() {
        let err = match DisconnectedBinder.bind().await {
            Ok(_) => panic!("expected bind to fail"),
            Err(e) => e,
        };
        assert!(matches!(err, ConnectionError::ProviderUnavailable));
    }
}
