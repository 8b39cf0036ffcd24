//! Startup configuration, read from the environment (and `.env`, if present).

use thiserror::Error;

pub const DATABASE_URL: &str = "VAULT_DATABASE_URL";
pub const SESSION_KEY: &str = "VAULT_SESSION_KEY";
pub const BIND: &str = "VAULT_BIND";

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub session_key: String,
    pub bind: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Ok(Self {
            database_url: get(DATABASE_URL).ok_or(ConfigError::Missing(DATABASE_URL))?,
            session_key: get(SESSION_KEY).ok_or(ConfigError::Missing(SESSION_KEY))?,
            bind: get(BIND).unwrap_or_else(|| DEFAULT_BIND.to_string()),
        })
    }
}
