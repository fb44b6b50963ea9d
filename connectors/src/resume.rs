// HTTP client for the external resume-generation service

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

use credport_core::credentials::CredentialView;
use credport_core::error::ResumeError;
use credport_core::identity::UserIdentity;
use credport_core::resume::ResumeGenerator;

const RESUME_HTTP_TIMEOUT_SECS: u64 = 30;

pub struct HttpResumeGenerator {
    endpoint: String,
    client: Client,
}

impl HttpResumeGenerator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let timeout = Duration::from_secs(RESUME_HTTP_TIMEOUT_SECS);
        let client = Client::builder().timeout(timeout).build().unwrap_or_else(|err| {
            warn!(
                "Failed to build resume reqwest client with timeout ({}); using default client",
                err
            );
            Client::new()
        });

        Self {
            endpoint: endpoint.into(),
            client,
        }
    }
}

#[async_trait]
impl ResumeGenerator for HttpResumeGenerator {
    async fn generate(&self, identity: &UserIdentity, credentials: &[CredentialView]) -> Result<String, ResumeError> {
        let payload = serde_json::json!({
            "requestedAt": chrono::Utc::now().timestamp(),
            "user": {
                "id": identity.id,
                "name": identity.name,
                "email": identity.email,
                "accountType": identity.account_type,
            },
            "credentials": credentials
                .iter()
                .map(|credential| {
                    serde_json::json!({
                        "tokenId": credential.token_id.to_string(),
                        "studentName": credential.student_name,
                        "degree": credential.degree,
                        "university": credential.university,
                        "ipfsHash": credential.ipfs_hash,
                    })
                })
                .collect::<Vec<_>>(),
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|err| ResumeError::backend(format!("request error: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ResumeError::backend(format!("resume service returned {status}: {body}")));
        }

        response
            .text()
            .await
            .map_err(|err| ResumeError::backend(format!("read response: {err}")))
    }
}
