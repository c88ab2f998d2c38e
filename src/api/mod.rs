use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::models::market::TokenSnapshot;

pub mod dexscreener;

pub use dexscreener::DexScreenerClient;

/// Why a lookup against the price-data provider produced no data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected status: {0}")]
    Status(u16),
    #[error("invalid response: {0}")]
    Parse(String),
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Status(status.as_u16())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Source of token snapshots and newly listed pairs.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Looks up one pair. Every failure mode is reported as an `ApiError`.
    async fn fetch_token(&self, pair_address: &str) -> ApiResult<TokenSnapshot>;

    /// Returns up to `limit` pair addresses for the newest token profiles.
    /// Any failure during the lookup discards partial results.
    async fn fetch_latest_pairs(&self, limit: usize) -> ApiResult<Vec<String>>;
}
