//! Provider traits wrapping the external platforms' sign-in flows.
//!
//! The platforms' SDKs are callback-based; implementations adapt them to
//! futures at this boundary so everything inward is callback-free.

use async_trait::async_trait;

use crate::errors::Result;

/// Signed-in identity on the document-store platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreUser {
    pub user_id: String,
    pub email: Option<String>,
}

/// Sign-in to the document-store platform.
#[async_trait]
pub trait StoreAuthProvider: Send + Sync {
    /// Runs the platform sign-in flow to completion.
    async fn sign_in(&self) -> Result<StoreUser>;
}

/// Sign-in to the geospatial analysis backend.
#[async_trait]
pub trait GeoAuthProvider: Send + Sync {
    /// Initializes the backend: direct credentials when the user is
    /// allow-listed, otherwise a token minted by the token server.
    async fn initialize(&self) -> Result<()>;
}
