//! Configuration model loaded from external sources.

use serde::Deserialize;

fn default_refresh_timeout_secs() -> u64 {
    10
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub database_url: String,
    pub templates_dir: String,
    pub secret: String,
    pub auth_service_url: String,
    /// Upper bound for loading a borrower's loan before the page falls back to the loader.
    #[serde(default = "default_refresh_timeout_secs")]
    pub refresh_timeout_secs: u64,
}
