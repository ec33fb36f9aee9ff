//! Minting of analysis-backend access tokens from a service account.
//!
//! The dashboard needs short-lived, read-only access tokens for the
//! geospatial analysis backend. They are minted through the standard
//! service-account OAuth flow: a signed JWT assertion is exchanged at
//! the platform's token endpoint for an access token scoped to
//! read-only analysis access. Tokens are not per-user, so one token
//! serves every caller until it nears expiry.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Read-only analysis scope requested for every minted token.
const EE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/earthengine.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime claimed in the signed assertion; the platform caps issued
/// tokens at one hour regardless.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// An access token for the analysis backend, in the shape the dashboard
/// expects: the token plus its absolute expiry time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub access_token: String,
    pub expire_time: DateTime<Utc>,
}

impl AccessToken {
    /// Time left until this token expires. Negative once expired.
    pub fn remaining_validity(&self, now: DateTime<Utc>) -> chrono::Duration {
        self.expire_time - now
    }
}

#[derive(Error, Debug)]
pub enum MintError {
    #[error("service-account key is unusable: {0}")]
    Key(String),

    #[error("token endpoint request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token endpoint response was unusable: {0}")]
    Token(String),
}

/// Produces fresh analysis-backend access tokens.
#[async_trait]
pub trait TokenMinter: Send + Sync {
    async fn mint(&self) -> Result<AccessToken, MintError>;
}

/// The fields of a platform service-account key file this server uses.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Minter backed by a service-account key file.
#[derive(Debug)]
pub struct ServiceAccountMinter {
    client: reqwest::Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
}

impl ServiceAccountMinter {
    pub fn from_key_file(path: &str) -> Result<Self, MintError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MintError::Key(format!("cannot read {path}: {e}")))?;
        let key: ServiceAccountKey = serde_json::from_str(&contents)
            .map_err(|e| MintError::Key(format!("cannot parse {path}: {e}")))?;
        Self::new(key)
    }

    pub fn new(key: ServiceAccountKey) -> Result<Self, MintError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| MintError::Key(format!("bad private key: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");
        Ok(Self {
            client,
            key,
            encoding_key,
        })
    }

    fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String, MintError> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: EE_READONLY_SCOPE,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| MintError::Key(format!("cannot sign assertion: {e}")))
    }
}

#[async_trait]
impl TokenMinter for ServiceAccountMinter {
    async fn mint(&self) -> Result<AccessToken, MintError> {
        let now = Utc::now();
        let assertion = self.signed_assertion(now)?;
        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(MintError::Token(format!("{status}: {body}")));
        }
        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| MintError::Token(format!("bad token payload: {e}")))?;
        Ok(AccessToken {
            access_token: token.access_token,
            expire_time: now + chrono::Duration::seconds(token.expires_in),
        })
    }
}
