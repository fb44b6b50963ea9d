use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{IdentityError, StoreError};
use crate::session::ChainSession;
use crate::wallet::canonical_address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Student,
    Institution,
}

impl AccountType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "student" => Some(AccountType::Student),
            "institution" => Some(AccountType::Institution),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Student => "student",
            AccountType::Institution => "institution",
        }
    }
}

/// The application-level account record, independent of any wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub account_type: AccountType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<Address>,
}

/// Explicit registration payload, one arm per signup path.
#[derive(Debug, Clone)]
pub enum Registration {
    Email {
        name: String,
        email: String,
        password: String,
        account_type: AccountType,
    },
    Wallet {
        name: String,
        account_type: AccountType,
        wallet_address: Address,
    },
}

/// Single-slot durable store for the active identity. Writes are always
/// full-record overwrites.
#[mockall::automock]
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn load(&self) -> Result<Option<UserIdentity>, StoreError>;
    async fn save(&self, identity: &UserIdentity) -> Result<(), StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityChange {
    /// A provisional identity was synthesized from the wallet address.
    Created,
    /// An existing identity was linked (or re-linked) to the address.
    Linked,
    Unchanged,
}

/// Keeps the persisted identity in step with the chain session.
pub struct IdentityService {
    store: Arc<dyn IdentityStore>,
    active: Option<UserIdentity>,
}

impl IdentityService {
    /// Reads the persisted record; the store is the sole source of truth
    /// across application reloads.
    pub async fn load(store: Arc<dyn IdentityStore>) -> Result<Self, IdentityError> {
        let active = store.load().await.map_err(IdentityError::Store)?;
        Ok(Self { store, active })
    }

    pub fn active(&self) -> Option<&UserIdentity> {
        self.active.as_ref()
    }

    /// Reconciles the identity with the session's current address:
    /// synthesizes a provisional identity for a first-time wallet, links
    /// an unlinked identity, and re-links on address mismatch. A session
    /// without an address changes nothing; unlinking is always explicit.
    pub async fn reconcile(&mut self, wallet: Option<Address>) -> Result<IdentityChange, IdentityError> {
        let Some(address) = wallet else {
            return Ok(IdentityChange::Unchanged);
        };

        match &self.active {
            None => {
                let identity = synthesize_identity(&address);
                info!(id = %identity.id, "synthesized provisional identity for wallet");
                self.persist(identity).await?;
                Ok(IdentityChange::Created)
            }
            Some(identity) if identity.wallet_address == Some(address) => Ok(IdentityChange::Unchanged),
            Some(_) => {
                self.link(address).await?;
                Ok(IdentityChange::Linked)
            }
        }
    }

    /// Binds the address to the active identity, overwriting any previous
    /// link.
    pub async fn link(&mut self, address: Address) -> Result<(), IdentityError> {
        let mut identity = self.active.clone().ok_or(IdentityError::NoActiveSession)?;
        identity.wallet_address = Some(address);
        self.persist(identity).await?;
        info!(address = %canonical_address(&address), "wallet linked to identity");
        Ok(())
    }

    /// Removes the wallet link. Deliberately decoupled from the wallet's
    /// actual connection state: the account survives without the link.
    pub async fn unlink(&mut self) -> Result<(), IdentityError> {
        let mut identity = self.active.clone().ok_or(IdentityError::NoActiveSession)?;
        identity.wallet_address = None;
        self.persist(identity).await?;
        info!("wallet unlinked from identity");
        Ok(())
    }

    pub async fn update_account_type(&mut self, account_type: AccountType) -> Result<(), IdentityError> {
        let mut identity = self.active.clone().ok_or(IdentityError::NoActiveSession)?;
        identity.account_type = account_type;
        self.persist(identity).await
    }

    /// Placeholder sign-in, not a security boundary: the account type is
    /// derived from the email and the password is not checked here.
    pub async fn login(&mut self, email: &str, _password: &str) -> Result<UserIdentity, IdentityError> {
        let account_type = if email.contains("institution") {
            AccountType::Institution
        } else {
            AccountType::Student
        };
        let name = email.split('@').next().unwrap_or(email).to_string();
        let identity = UserIdentity {
            id: email.to_string(),
            name,
            email: Some(email.to_string()),
            account_type,
            wallet_address: None,
        };
        self.persist(identity.clone()).await?;
        Ok(identity)
    }

    pub async fn register(&mut self, registration: Registration) -> Result<UserIdentity, IdentityError> {
        let identity = match registration {
            Registration::Email {
                name,
                email,
                password: _,
                account_type,
            } => UserIdentity {
                id: email.clone(),
                name,
                email: Some(email),
                account_type,
                wallet_address: None,
            },
            Registration::Wallet {
                name,
                account_type,
                wallet_address,
            } => UserIdentity {
                id: format!("wallet-{}", canonical_address(&wallet_address)),
                name,
                email: None,
                account_type,
                wallet_address: Some(wallet_address),
            },
        };
        self.persist(identity.clone()).await?;
        Ok(identity)
    }

    /// Ends the application session: disconnects the wallet if one is
    /// linked, then removes the persisted record.
    pub async fn logout(&mut self, session: &mut ChainSession) -> Result<(), IdentityError> {
        if let Some(identity) = &self.active
            && identity.wallet_address.is_some()
        {
            session.disconnect();
        }
        self.store.clear().await.map_err(IdentityError::Store)?;
        self.active = None;
        Ok(())
    }

    /// Full-record write: partial patches are not safe across suspension
    /// points on the cooperative loop.
    async fn persist(&mut self, identity: UserIdentity) -> Result<(), IdentityError> {
        self.store.save(&identity).await.map_err(IdentityError::Store)?;
        self.active = Some(identity);
        Ok(())
    }
}

fn synthesize_identity(address: &Address) -> UserIdentity {
    let canonical = canonical_address(address);
    // 0x plus the first 8 hex digits as a readable default display name.
    let name: String = canonical.chars().take(10).collect();
    UserIdentity {
        id: format!("wallet-{canonical}"),
        name,
        email: None,
        account_type: AccountType::Student,
        wallet_address: Some(*address),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::REQUIRED_CHAIN_ID;
    use crate::contract::{CredentialContract, MockContractBinder, MockCredentialContract};
    use crate::wallet::MockWalletProvider;
    use std::sync::Mutex;

    /// In-memory store that records every persisted record.
    struct RecordingStore {
        slot: Mutex<Option<UserIdentity>>,
    }

    impl RecordingStore {
        fn new(initial: Option<UserIdentity>) -> Arc<Self> {
            Arc::new(Self {
                slot: Mutex::new(initial),
            })
        }

        fn stored(&self) -> Option<UserIdentity> {
            self.slot.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl IdentityStore for RecordingStore {
        async fn load(&self) -> Result<Option<UserIdentity>, StoreError> {
            Ok(self.stored())
        }

        async fn save(&self, identity: &UserIdentity) -> Result<(), StoreError> {
            *self.slot.lock().unwrap() = Some(identity.clone());
            Ok(())
        }

        async fn clear(&self) -> Result<(), StoreError> {
            *self.slot.lock().unwrap() = None;
            Ok(())
        }
    }

    fn address(fill: u8) -> Address {
        Address::from([fill; 20])
    }

    fn stored_identity(wallet: Option<Address>) -> UserIdentity {
        UserIdentity {
            id: "alice@example.org".to_string(),
            name: "alice".to_string(),
            email: Some("alice@example.org".to_string()),
            account_type: AccountType::Student,
            wallet_address: wallet,
        }
    }

    async fn connected_session(account: Address) -> ChainSession {
        let mut provider = MockWalletProvider::new();
        provider.expect_chain_id().returning(|| Ok(REQUIRED_CHAIN_ID));
        provider
            .expect_request_accounts()
            .returning(move || Ok(vec![account]));
        let mut binder = MockContractBinder::new();
        binder
            .expect_bind()
            .returning(|| Ok(Arc::new(MockCredentialContract::new()) as Arc<dyn CredentialContract>));

        let mut session = ChainSession::new(Some(Arc::new(provider)), Arc::new(binder));
        session.connect().await.unwrap();
        session
    }

    #[tokio::test]
    async fn first_wallet_connection_synthesizes_identity() {
        let store = RecordingStore::new(None);
        let mut service = IdentityService::load(store.clone()).await.unwrap();

        let wallet: Address = "0xabcd000000000000000000000000000000001234".parse().unwrap();
        let change = service.reconcile(Some(wallet)).await.unwrap();

        assert_eq!(change, IdentityChange::Created);
        let identity = store.stored().unwrap();
        assert_eq!(identity.id, "wallet-0xabcd000000000000000000000000000000001234");
        assert_eq!(identity.account_type, AccountType::Student);
        assert_eq!(identity.name, "0xabcd0000");
        assert_eq!(identity.wallet_address, Some(wallet));
    }

    #[tokio::test]
    async fn reconcile_links_unlinked_identity() {
        let store = RecordingStore::new(Some(stored_identity(None)));
        let mut service = IdentityService::load(store.clone()).await.unwrap();

        let wallet = address(0x21);
        let change = service.reconcile(Some(wallet)).await.unwrap();

        assert_eq!(change, IdentityChange::Linked);
        assert_eq!(store.stored().unwrap().wallet_address, Some(wallet));
    }

    #[tokio::test]
    async fn reconcile_overwrites_mismatched_link() {
        let old = address(0xaa);
        let new = address(0xbb);
        let store = RecordingStore::new(Some(stored_identity(Some(old))));
        let mut service = IdentityService::load(store.clone()).await.unwrap();

        let change = service.reconcile(Some(new)).await.unwrap();

        assert_eq!(change, IdentityChange::Linked);
        let identity = store.stored().unwrap();
        assert_eq!(identity.wallet_address, Some(new));
        assert_eq!(identity.id, "alice@example.org", "link must not replace the identity");
    }

    #[tokio::test]
    async fn reconcile_with_matching_link_is_a_noop() {
        let wallet = address(0xcc);
        let store = RecordingStore::new(Some(stored_identity(Some(wallet))));
        let mut service = IdentityService::load(store.clone()).await.unwrap();

        let change = service.reconcile(Some(wallet)).await.unwrap();
        assert_eq!(change, IdentityChange::Unchanged);
    }

    #[tokio::test]
    async fn reconcile_without_address_changes_nothing() {
        let store = RecordingStore::new(None);
        let mut service = IdentityService::load(store.clone()).await.unwrap();

        let change = service.reconcile(None).await.unwrap();
        assert_eq!(change, IdentityChange::Unchanged);
        assert_eq!(store.stored(), None);
    }

    #[tokio::test]
    async fn link_without_identity_fails() {
        let store = RecordingStore::new(None);
        let mut service = IdentityService::load(store).await.unwrap();

        let err = service.link(address(0x01)).await.unwrap_err();
        assert!(matches!(err, IdentityError::NoActiveSession));
    }

    #[tokio::test]
    async fn unlink_clears_the_link_but_not_the_session() {
        let wallet = address(0x42);
        let mut session = connected_session(wallet).await;

        let store = RecordingStore::new(Some(stored_identity(Some(wallet))));
        let mut service = IdentityService::load(store.clone()).await.unwrap();

        service.unlink().await.unwrap();

        assert_eq!(store.stored().unwrap().wallet_address, None);
        assert_eq!(session.address(), Some(wallet), "unlink must not touch the wallet session");

        // and the other direction: disconnect does not unlink
        session.disconnect();
        assert_eq!(service.active().unwrap().wallet_address, None);
    }

    #[tokio::test]
    async fn login_heuristic_classifies_account_type() {
        let store = RecordingStore::new(None);
        let mut service = IdentityService::load(store.clone()).await.unwrap();

        let identity = service.login("a@institution.org", "pw").await.unwrap();
        assert_eq!(identity.account_type, AccountType::Institution);

        let identity = service.login("a@school.org", "pw").await.unwrap();
        assert_eq!(identity.account_type, AccountType::Student);
        assert_eq!(identity.id, "a@school.org");
        assert_eq!(identity.name, "a");
        assert_eq!(store.stored().unwrap(), identity);
    }

    #[tokio::test]
    async fn register_wallet_arm_synthesizes_wallet_id() {
        let store = RecordingStore::new(None);
        let mut service = IdentityService::load(store.clone()).await.unwrap();

        let wallet = address(0x07);
        let identity = service
            .register(Registration::Wallet {
                name: "Bob".to_string(),
                account_type: AccountType::Institution,
                wallet_address: wallet,
            })
            .await
            .unwrap();

        assert!(identity.id.starts_with("wallet-0x"));
        assert_eq!(identity.wallet_address, Some(wallet));
        assert_eq!(store.stored().unwrap(), identity);
    }

    #[tokio::test]
    async fn logout_disconnects_linked_wallet_and_clears_store() {
        let wallet = address(0x18);
        let mut session = connected_session(wallet).await;

        let store = RecordingStore::new(Some(stored_identity(Some(wallet))));
        let mut service = IdentityService::load(store.clone()).await.unwrap();

        service.logout(&mut session).await.unwrap();

        assert_eq!(store.stored(), None);
        assert_eq!(service.active(), None);
        assert_eq!(session.address(), None);
    }

    #[tokio::test]
    async fn logout_without_link_keeps_session_untouched() {
        let wallet = address(0x19);
        let mut session = connected_session(wallet).await;

        let store = RecordingStore::new(Some(stored_identity(None)));
        let mut service = IdentityService::load(store.clone()).await.unwrap();

        service.logout(&mut session).await.unwrap();

        assert_eq!(store.stored(), None);
        assert_eq!(session.address(), Some(wallet));
    }

    #[tokio::test]
    async fn update_account_type_persists_full_record() {
        let store = RecordingStore::new(Some(stored_identity(None)));
        let mut service = IdentityService::load(store.clone()).await.unwrap();

        service.update_account_type(AccountType::Institution).await.unwrap();

        let identity = store.stored().unwrap();
        assert_eq!(identity.account_type, AccountType::Institution);
        assert_eq!(identity.id, "alice@example.org");
    }

    #[test]
    fn account_type_serializes_lower_case() {
        let json = serde_json::to_string(&AccountType::Institution).unwrap();
        assert_eq!(json, "\"institution\"");
        assert_eq!(AccountType::parse("student"), Some(AccountType::Student));
        assert_eq!(AccountType::parse("admin"), None);
    }
}
