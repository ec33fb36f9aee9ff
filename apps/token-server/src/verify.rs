//! Verification of the sign-in id tokens callers present.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Endpoint that validates an id token's signature and returns its
/// claims.
const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum VerifyError {
    /// The token is invalid, expired, or minted for another audience.
    #[error("id token rejected: {0}")]
    Rejected(String),

    #[error("verification request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Checks that a caller's id token is genuine and was issued for this
/// deployment's OAuth client.
#[async_trait]
pub trait IdTokenVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<(), VerifyError>;
}

#[derive(Deserialize)]
struct TokenInfo {
    aud: String,
}

/// Verifier backed by the platform's tokeninfo endpoint, which performs
/// the signature and expiry checks server-side.
pub struct GoogleIdTokenVerifier {
    client: reqwest::Client,
    client_id: String,
}

impl GoogleIdTokenVerifier {
    pub fn new(client_id: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            client_id: client_id.to_string(),
        }
    }
}

#[async_trait]
impl IdTokenVerifier for GoogleIdTokenVerifier {
    async fn verify(&self, id_token: &str) -> Result<(), VerifyError> {
        let response = self
            .client
            .get(TOKENINFO_URL)
            .query(&[("id_token", id_token)])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(VerifyError::Rejected(format!("{status}: {body}")));
        }
        let info: TokenInfo = serde_json::from_str(&body)
            .map_err(|e| VerifyError::Rejected(format!("bad tokeninfo payload: {e}")))?;
        // The token must have been minted for this deployment's client,
        // not merely be a valid token for some other application.
        if info.aud != self.client_id {
            return Err(VerifyError::Rejected(format!(
                "audience mismatch: {}",
                info.aud
            )));
        }
        Ok(())
    }
}
