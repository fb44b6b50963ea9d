use credport_commons::error::{CodedError, ErrorCode, format_with_code};
use credport_connectors::error::ConnectorError;
use credport_core::error::{
    ConnectionError, ContractCallError, CoreError, IdentityError, NetworkSwitchError, ResumeError,
};
use thiserror::Error;

use crate::config::ConfigError;

pub type PortalResult<T> = Result<T, PortalError>;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Connector(#[from] ConnectorError),
    #[error("{message}")]
    Command { message: String },
}

impl PortalError {
    pub fn command(message: impl Into<String>) -> Self {
        PortalError::Command {
            message: message.into(),
        }
    }
}

impl From<ConnectionError> for PortalError {
    fn from(value: ConnectionError) -> Self {
        PortalError::Core(value.into())
    }
}

impl From<NetworkSwitchError> for PortalError {
    fn from(value: NetworkSwitchError) -> Self {
        PortalError::Core(value.into())
    }
}

impl From<ContractCallError> for PortalError {
    fn from(value: ContractCallError) -> Self {
        PortalError::Core(value.into())
    }
}

impl From<IdentityError> for PortalError {
    fn from(value: IdentityError) -> Self {
        PortalError::Core(value.into())
    }
}

impl From<ResumeError> for PortalError {
    fn from(value: ResumeError) -> Self {
        PortalError::Core(value.into())
    }
}

impl CodedError for PortalError {
    fn code(&self) -> ErrorCode {
        match self {
            PortalError::Config(err) => err.code(),
            PortalError::Core(err) => err.code(),
            PortalError::Connector(err) => err.code(),
            PortalError::Command { .. } => ErrorCode::PortalCommand,
        }
    }
}

impl From<PortalError> for String {
    fn from(value: PortalError) -> Self {
        format_with_code(&value)
    }
}
