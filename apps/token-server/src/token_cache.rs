//! Cached analysis-backend token, refreshed ahead of expiry.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::time::{interval, Duration};
use tracing::{info, warn};

use crate::minter::{AccessToken, MintError, TokenMinter};

/// How often the background task replaces the cached token. Tokens last
/// an hour and the dashboard regenerates with five minutes left, so a
/// 40-minute cadence keeps at least 20 minutes of validity in hand.
pub const TOKEN_REFRESH_INTERVAL: Duration = Duration::from_secs(40 * 60);

/// A served token must have at least this much validity left. The
/// periodic refresh should make this unreachable; it guards against the
/// refresh task having stalled.
pub const MIN_TOKEN_LIFETIME: chrono::Duration = chrono::Duration::minutes(10);

/// Holds the most recently minted token so requests share it for almost
/// its full lifetime instead of minting per call.
pub struct TokenCache {
    minter: Arc<dyn TokenMinter>,
    current: Mutex<Option<AccessToken>>,
}

impl TokenCache {
    pub fn new(minter: Arc<dyn TokenMinter>) -> Self {
        Self {
            minter,
            current: Mutex::new(None),
        }
    }

    /// The token to serve: the cached one while it has comfortable
    /// validity left, otherwise a freshly minted replacement.
    pub async fn current(&self) -> Result<AccessToken, MintError> {
        let mut slot = self.current.lock().await;
        if let Some(token) = slot.as_ref() {
            if token.remaining_validity(Utc::now()) >= MIN_TOKEN_LIFETIME {
                return Ok(token.clone());
            }
            warn!("cached token close to expiry; minting a replacement");
        }
        let fresh = self.minter.mint().await?;
        *slot = Some(fresh.clone());
        Ok(fresh)
    }

    /// Replaces the cached token. A failed mint keeps the previous token
    /// in place; requests fall back to minting on demand.
    pub async fn refresh(&self) {
        match self.minter.mint().await {
            Ok(token) => {
                *self.current.lock().await = Some(token);
            }
            Err(err) => warn!("periodic token refresh failed: {err}"),
        }
    }

    /// Starts the pre-fetching refresh task. The first tick fires
    /// immediately so a token is usually ready before the first request.
    pub fn start_refresh_task(cache: Arc<Self>) {
        tokio::spawn(async move {
            info!("Token refresh task started (40-minute interval)");
            let mut refresh_interval = interval(TOKEN_REFRESH_INTERVAL);
            loop {
                refresh_interval.tick().await;
                cache.refresh().await;
            }
        });
    }
}
