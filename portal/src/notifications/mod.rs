use async_trait::async_trait;
use std::sync::Arc;

pub mod telegram;

/// Ops-channel notifications for session and issuance events.
#[async_trait]
pub trait PortalNotifier: Send + Sync {
    async fn notify_startup(&self) {}
    async fn notify_wallet_connected(&self, _address: &str) {}
    async fn notify_wallet_disconnected(&self) {}
    async fn notify_chain_changed(&self, _network: &str) {}
    async fn notify_credential_minted(&self, _tx_hash: &str, _student: &str) {}
}

pub struct NoopPortalNotifier;

#[async_trait]
impl PortalNotifier for NoopPortalNotifier {}

pub fn noop_portal_notifier() -> Arc<dyn PortalNotifier> {
    Arc::new(NoopPortalNotifier)
}
