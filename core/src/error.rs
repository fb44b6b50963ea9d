use credport_commons::error::{CodedError, ErrorCode, ExternalError, format_with_code};
use thiserror::Error;

use crate::wallet::ProviderRpcError;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Network(#[from] NetworkSwitchError),
    #[error(transparent)]
    Contract(#[from] ContractCallError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Resume(#[from] ResumeError),
}

impl CodedError for CoreError {
    fn code(&self) -> ErrorCode {
        match self {
            CoreError::Connection(err) => err.code(),
            CoreError::Network(err) => err.code(),
            CoreError::Contract(err) => err.code(),
            CoreError::Identity(err) => err.code(),
            CoreError::Resume(err) => err.code(),
        }
    }
}

impl From<CoreError> for String {
    fn from(value: CoreError) -> Self {
        format_with_code(&value)
    }
}

/// Failure to establish or refresh the wallet connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("no wallet provider available")]
    ProviderUnavailable,
    #[error("wallet connection rejected: {reason}")]
    Rejected { reason: String },
    #[error("wallet provider error")]
    Provider {
        #[source]
        source: ExternalError,
    },
}

impl ConnectionError {
    pub fn provider<E>(err: E) -> Self
    where
        E: Into<ExternalError>,
    {
        ConnectionError::Provider { source: err.into() }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        ConnectionError::Rejected { reason: reason.into() }
    }
}

impl CodedError for ConnectionError {
    fn code(&self) -> ErrorCode {
        ErrorCode::CoreConnection
    }
}

impl From<ConnectionError> for String {
    fn from(value: ConnectionError) -> Self {
        format_with_code(&value)
    }
}

#[derive(Debug, Error)]
pub enum NetworkSwitchError {
    #[error("network switch rejected: {reason}")]
    SwitchRejected { reason: String },
    #[error("registering the required chain failed: {reason}")]
    AddChainRejected { reason: String },
}

impl NetworkSwitchError {
    pub fn switch(err: ProviderRpcError) -> Self {
        NetworkSwitchError::SwitchRejected {
            reason: err.to_string(),
        }
    }

    pub fn add_chain(err: ProviderRpcError) -> Self {
        NetworkSwitchError::AddChainRejected {
            reason: err.to_string(),
        }
    }
}

impl CodedError for NetworkSwitchError {
    fn code(&self) -> ErrorCode {
        ErrorCode::CoreNetworkSwitch
    }
}

impl From<NetworkSwitchError> for String {
    fn from(value: NetworkSwitchError) -> Self {
        format_with_code(&value)
    }
}

/// Failure of a read or write through the bound credential contract.
#[derive(Debug, Error)]
pub enum ContractCallError {
    #[error("credential contract is not bound for this session")]
    NotBound,
    #[error("contract call {op} failed: {reason}")]
    Call { op: &'static str, reason: String },
}

impl ContractCallError {
    pub fn call(op: &'static str, reason: impl Into<String>) -> Self {
        ContractCallError::Call {
            op,
            reason: reason.into(),
        }
    }
}

impl CodedError for ContractCallError {
    fn code(&self) -> ErrorCode {
        ErrorCode::CoreContractCall
    }
}

impl From<ContractCallError> for String {
    fn from(value: ContractCallError) -> Self {
        format_with_code(&value)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("identity store error")]
    Backend {
        #[source]
        source: ExternalError,
    },
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<ExternalError>,
    {
        StoreError::Backend { source: err.into() }
    }
}

impl CodedError for StoreError {
    fn code(&self) -> ErrorCode {
        ErrorCode::CoreStore
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("no active identity session")]
    NoActiveSession,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CodedError for IdentityError {
    fn code(&self) -> ErrorCode {
        match self {
            IdentityError::NoActiveSession => ErrorCode::CoreIdentity,
            IdentityError::Store(err) => err.code(),
        }
    }
}

impl From<IdentityError> for String {
    fn from(value: IdentityError) -> Self {
        format_with_code(&value)
    }
}

#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("no credentials to include in the resume")]
    EmptyCredentialList,
    #[error("resume generation backend error")]
    Backend {
        #[source]
        source: ExternalError,
    },
}

impl ResumeError {
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<ExternalError>,
    {
        ResumeError::Backend { source: err.into() }
    }
}

impl CodedError for ResumeError {
    fn code(&self) -> ErrorCode {
        ErrorCode::CoreResume
    }
}

impl From<ResumeError> for String {
    fn from(value: ResumeError) -> Self {
        format_with_code(&value)
    }
}
