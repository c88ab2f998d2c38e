use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::api::dexscreener::{API_BASE_URL, DEFAULT_CHAIN};
use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_HISTORY_LIMIT: usize = 60;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub telegram_token: String,
    #[serde(default)]
    pub admin_chat_id: Option<i64>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_base_url")]
    pub dexscreener_base_url: String,
    #[serde(default = "default_chain")]
    pub chain: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_base_url() -> String {
    API_BASE_URL.to_string()
}

fn default_chain() -> String {
    DEFAULT_CHAIN.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl Config {
    /// Loads a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Unset and blank
    /// values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let telegram_token = get("TELEGRAM_TOKEN")
            .ok_or_else(|| Error::ConfigError("TELEGRAM_TOKEN is not set".to_string()))?;

        let config = Config {
            telegram_token,
            admin_chat_id: get("ADMIN_CHAT_ID").map(|v| parse_var("ADMIN_CHAT_ID", &v)).transpose()?,
            port: get("PORT").map(|v| parse_var("PORT", &v)).transpose()?.unwrap_or(DEFAULT_PORT),
            dexscreener_base_url: get("DEXSCREENER_BASE_URL").unwrap_or_else(default_base_url),
            chain: get("DEX_CHAIN").unwrap_or_else(default_chain),
            request_timeout_secs: get("REQUEST_TIMEOUT_SECS")
                .map(|v| parse_var("REQUEST_TIMEOUT_SECS", &v))
                .transpose()?
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            history_limit: get("HISTORY_LIMIT")
                .map(|v| parse_var("HISTORY_LIMIT", &v))
                .transpose()?
                .unwrap_or(DEFAULT_HISTORY_LIMIT),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.telegram_token.trim().is_empty() {
            return Err(Error::ConfigError("telegram_token cannot be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::ConfigError("request_timeout_secs must be positive".to_string()));
        }
        if self.history_limit == 0 {
            return Err(Error::ConfigError("history_limit must be positive".to_string()));
        }
        Ok(())
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| Error::ConfigError(format!("{} = {:?}: {}", key, value, e)))
}
