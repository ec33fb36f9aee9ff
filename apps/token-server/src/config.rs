use std::net::SocketAddr;

/// OAuth client id the dashboard signs users in with; id tokens
/// presented to this server must carry it as their audience.
pub const DEFAULT_OAUTH_CLIENT_ID: &str =
    "38420505624-boghq4foqi5anc9kc5c5tsq82ar9k4n0.apps.googleusercontent.com";

/// Origins the server will mint tokens for when no override is set:
/// local development and the production dashboard host.
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:8080,https://givedirectly.github.io";

pub struct Config {
    pub listen_addr: SocketAddr,
    pub allowed_origins: Vec<String>,
    pub oauth_client_id: String,
    /// Path of the service-account key file used to mint analysis-backend
    /// access tokens.
    pub service_account_key: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("RM_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:9080".to_string())
            .parse()
            .expect("Invalid RM_LISTEN_ADDR");
        let allowed_origins = std::env::var("RM_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let oauth_client_id = std::env::var("RM_OAUTH_CLIENT_ID")
            .unwrap_or_else(|_| DEFAULT_OAUTH_CLIENT_ID.to_string());
        let service_account_key = std::env::var("RM_SERVICE_ACCOUNT_KEY")
            .unwrap_or_else(|_| "./service-account.json".into());
        Self {
            listen_addr,
            allowed_origins,
            oauth_client_id,
            service_account_key,
        }
    }
}
