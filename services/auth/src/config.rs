use serde::Deserialize;

use leadgate_core::config::Config;

fn default_port() -> u16 {
    3100
}

fn default_cookie_domain() -> String {
    "localhost".to_owned()
}

/// Auth service configuration, loaded from the environment at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub database_url: String,
    /// When set, rate-limit counters are shared across replicas via Redis;
    /// otherwise each process keeps its own in-memory counters.
    pub redis_url: Option<String>,
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub mail_api_url: String,
    pub mail_api_key: String,
    pub mail_from: String,
    #[serde(default = "default_cookie_domain")]
    pub cookie_domain: String,
    #[serde(default = "default_port")]
    pub auth_port: u16,
}

impl Config for AuthConfig {}
