// Signer-bound client over the credential registry contract

use alloy::{
    network::EthereumWallet,
    primitives::{Address, B256, U256},
    providers::{DynProvider, Provider as _, ProviderBuilder},
    signers::local::PrivateKeySigner,
    sol,
};
use async_trait::async_trait;

use credport_core::contract::{CredentialContract, CredentialRecord};
use credport_core::error::{ConnectionError, ContractCallError};

use crate::reason::extract_reason;

sol! {
    #[sol(rpc)]
    contract CredentialRegistry {
        function mintCredential(
            address recipient,
            string studentName,
            string degree,
            string university,
            string uri
        ) external returns (uint256);
        function verifyCredential(uint256 tokenId)
            external
            view
            returns (string memory studentName, string memory degree, string memory university, string memory ipfsHash);
        function balanceOf(address owner) external view returns (uint256);
        function tokenOfOwnerByIndex(address owner, uint256 index) external view returns (uint256);
        function ownerOf(uint256 tokenId) external view returns (address);
        function getCredentialsByIssuer(address issuer) external view returns (uint256[] memory);
    }
}

#[derive(Clone)]
pub struct RegistryClient {
    pub registry: Address,
    pub provider: DynProvider,
}

impl RegistryClient {
    pub fn new(registry: Address, provider: DynProvider) -> Self {
        Self { registry, provider }
    }

    pub async fn connect(rpc_url: &str, signer: PrivateKeySigner, registry: Address) -> Result<Self, ConnectionError> {
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(rpc_url.parse().map_err(|e| ConnectionError::provider(format!("{e}")))?);

        Ok(Self {
            registry,
            provider: provider.erased(),
        })
    }

    fn contract(&self) -> CredentialRegistry::CredentialRegistryInstance<DynProvider> {
        CredentialRegistry::new(self.registry, self.provider.clone())
    }
}

#[async_trait]
impl CredentialContract for RegistryClient {
    async fn mint(
        &self,
        recipient: Address,
        student_name: &str,
        degree: &str,
        university: &str,
        uri: &str,
    ) -> Result<B256, ContractCallError> {
        let pending = self
            .contract()
            .mintCredential(
                recipient,
                student_name.to_string(),
                degree.to_string(),
                university.to_string(),
                uri.to_string(),
            )
            .send()
            .await
            .map_err(|e| ContractCallError::call("mintCredential", extract_reason(&e)))?;

        // Submission only; awaiting finality is the caller's concern.
        Ok(*pending.tx_hash())
    }

    async fn verify(&self, token_id: U256) -> Result<CredentialRecord, ContractCallError> {
        let ret = self
            .contract()
            .verifyCredential(token_id)
            .call()
            .await
            .map_err(|e| ContractCallError::call("verifyCredential", extract_reason(&e)))?;

        Ok(CredentialRecord {
            student_name: ret.studentName,
            degree: ret.degree,
            university: ret.university,
            ipfs_hash: ret.ipfsHash,
        })
    }

    async fn balance_of(&self, owner: Address) -> Result<U256, ContractCallError> {
        self.contract()
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| ContractCallError::call("balanceOf", extract_reason(&e)))
    }

    async fn token_of_owner_by_index(&self, owner: Address, index: U256) -> Result<U256, ContractCallError> {
        self.contract()
            .tokenOfOwnerByIndex(owner, index)
            .call()
            .await
            .map_err(|e| ContractCallError::call("tokenOfOwnerByIndex", extract_reason(&e)))
    }

    async fn owner_of(&self, token_id: U256) -> Result<Address, ContractCallError> {
        self.contract()
            .ownerOf(token_id)
            .call()
            .await
            .map_err(|e| ContractCallError::call("ownerOf", extract_reason(&e)))
    }

    async fn list_issued(&self, issuer: Address) -> Result<Vec<U256>, ContractCallError> {
        self.contract()
            .getCredentialsByIssuer(issuer)
            .call()
            .await
            .map_err(|e| ContractCallError::call("getCredentialsByIssuer", extract_reason(&e)))
    }
}
