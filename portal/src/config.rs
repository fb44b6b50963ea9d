use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use credport_commons::{
    env::config_dir,
    error::{CodedError, ErrorCode, ExternalError},
};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

// Deployed credential registry. Overridable for local chains via
// CREDPORT_REGISTRY_ADDRESS.
const DEFAULT_REGISTRY_ADDRESS: &str = "0x9fe46736679d2d9a65f0992f2272de9f3c7fa6e0";
const DEFAULT_RPC_URL: &str = "https://rpc-amoy.polygon.technology";
const DEFAULT_CHAIN_POLL_SECS: u64 = 15;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse address in {var}")]
    InvalidAddress {
        var: &'static str,
        #[source]
        source: ExternalError,
    },
    #[error("failed to parse wallet key in {var}")]
    InvalidKey {
        var: &'static str,
        #[source]
        source: ExternalError,
    },
}

impl CodedError for ConfigError {
    fn code(&self) -> ErrorCode {
        match self {
            ConfigError::InvalidAddress { .. } => ErrorCode::ConfigInvalidAddress,
            ConfigError::InvalidKey { .. } => ErrorCode::ConfigInvalidKey,
        }
    }
}

pub struct Config {
    pub rpc_url: String,
    /// Local signer standing in for the browser wallet. `None` means no
    /// wallet provider is available; screens then see a disconnected
    /// session instead of an error.
    pub wallet_key: Option<PrivateKeySigner>,
    pub registry_address: Address,
    pub identity_store_path: PathBuf,
    pub resume_url: Option<String>,
    pub chain_poll_secs: u64,
}

impl Config {
    pub fn load() -> ConfigResult<Arc<Self>> {
        let rpc_url = env::var("CREDPORT_RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string());

        let wallet_key = match env::var("CREDPORT_WALLET_KEY") {
            Ok(raw) => Some(raw.trim().parse().map_err(|e| ConfigError::InvalidKey {
                var: "CREDPORT_WALLET_KEY",
                source: ExternalError(format!("{e}")),
            })?),
            Err(_) => {
                debug!("CREDPORT_WALLET_KEY not set; running without a wallet provider");
                None
            }
        };

        let registry_raw =
            env::var("CREDPORT_REGISTRY_ADDRESS").unwrap_or_else(|_| DEFAULT_REGISTRY_ADDRESS.to_string());
        let registry_address = registry_raw.parse().map_err(|e| ConfigError::InvalidAddress {
            var: "CREDPORT_REGISTRY_ADDRESS",
            source: ExternalError(format!("{e}")),
        })?;

        let identity_store_path = env::var("CREDPORT_IDENTITY_STORE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(config_dir()).join("identity.json"));

        let resume_url = env::var("CREDPORT_RESUME_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let chain_poll_secs = env::var("CREDPORT_CHAIN_POLL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CHAIN_POLL_SECS);

        Ok(Arc::new(Self {
            rpc_url,
            wallet_key,
            registry_address,
            identity_store_path,
            resume_url,
            chain_poll_secs,
        }))
    }
}
