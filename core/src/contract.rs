use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;

use crate::error::{ConnectionError, ContractCallError};

/// On-chain credential fields as returned by the registry's verify call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub student_name: String,
    pub degree: String,
    pub university: String,
    pub ipfs_hash: String,
}

/// The fixed method surface of the deployed credential registry.
///
/// `mint` resolves once the transaction is submitted; awaiting finality
/// is the caller's concern.
#[mockall::automock]
#[async_trait]
pub trait CredentialContract: Send + Sync {
    async fn mint(
        &self,
        recipient: Address,
        student_name: &str,
        degree: &str,
        university: &str,
        uri: &str,
    ) -> Result<B256, ContractCallError>;

    async fn verify(&self, token_id: U256) -> Result<CredentialRecord, ContractCallError>;

    async fn balance_of(&self, owner: Address) -> Result<U256, ContractCallError>;

    /// 0-based enumeration of the owner's tokens.
    async fn token_of_owner_by_index(&self, owner: Address, index: U256) -> Result<U256, ContractCallError>;

    async fn owner_of(&self, token_id: U256) -> Result<Address, ContractCallError>;

    async fn list_issued(&self, issuer: Address) -> Result<Vec<U256>, ContractCallError>;
}

/// Builds a signer-bound contract handle for the current session.
#[mockall::automock]
#[async_trait]
pub trait ContractBinder: Send + Sync {
    async fn bind(&self) -> Result<Arc<dyn CredentialContract>, ConnectionError>;
}
