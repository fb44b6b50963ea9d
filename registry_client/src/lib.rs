//! # Credential Registry Client
//!
//! Client for the deployed academic-credential registry contract: a fixed
//! ABI at a fixed address on one designated chain.
//!
//! ## Usage
//!
//! ```no_run
//! use credential_registry_client::RegistryClient;
//! use credport_core::contract::CredentialContract;
//! use alloy::primitives::{Address, U256};
//! use alloy::signers::local::PrivateKeySigner;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry: Address = "0x5FbDB2315678afecb367f032d93F642f64180aa3".parse()?;
//!     let signer = PrivateKeySigner::random();
//!
//!     let client = RegistryClient::connect("https://rpc-amoy.polygon.technology", signer, registry).await?;
//!
//!     let record = client.verify(U256::from(1)).await?;
//!     println!("{}: {}, {}", record.student_name, record.degree, record.university);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod reason;

pub use client::RegistryClient;
