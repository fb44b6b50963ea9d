use async_trait::async_trait;

use crate::credentials::CredentialView;
use crate::error::ResumeError;
use crate::identity::UserIdentity;

/// External text-generation collaborator. The portal only forwards data.
#[mockall::automock]
#[async_trait]
pub trait ResumeGenerator: Send + Sync {
    async fn generate(&self, identity: &UserIdentity, credentials: &[CredentialView]) -> Result<String, ResumeError>;
}

/// Forwards the identity and credential list to the generator. The only
/// validation owned here is the non-empty check.
pub async fn generate_resume(
    generator: &dyn ResumeGenerator,
    identity: &UserIdentity,
    credentials: &[CredentialView],
) -> Result<String, ResumeError> {
    if credentials.is_empty() {
        return Err(ResumeError::EmptyCredentialList);
    }
    generator.generate(identity, credentials).await
}
