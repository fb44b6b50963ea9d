pub mod chain;
pub mod contract;
pub mod credentials;
pub mod error;
pub mod identity;
pub mod resume;
pub mod session;
pub mod wallet;
