use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::minter::ServiceAccountMinter;
use crate::token_cache::TokenCache;
use crate::verify::{GoogleIdTokenVerifier, IdTokenVerifier};

pub struct AppState {
    pub cache: Arc<TokenCache>,
    pub verifier: Arc<dyn IdTokenVerifier>,
    pub allowed_origins: Vec<String>,
}

pub fn init_tracing() {
    let log_format = std::env::var("RM_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let minter = ServiceAccountMinter::from_key_file(&config.service_account_key)?;
    let cache = Arc::new(TokenCache::new(Arc::new(minter)));
    // Pre-fetch so a token is usually ready before the first request.
    TokenCache::start_refresh_task(cache.clone());

    let verifier = Arc::new(GoogleIdTokenVerifier::new(&config.oauth_client_id));
    Ok(Arc::new(AppState {
        cache,
        verifier,
        allowed_origins: config.allowed_origins.clone(),
    }))
}
