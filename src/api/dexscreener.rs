use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::api::{ApiError, ApiResult, PriceSource};
use crate::config::Config;
use crate::models::market::TokenSnapshot;

pub const API_BASE_URL: &str = "https://api.dexscreener.com";
pub const DEFAULT_CHAIN: &str = "solana";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct PairLookupResponse {
    pair: Option<DexPair>,
    #[serde(default)]
    pairs: Option<Vec<DexPair>>,
}

impl PairLookupResponse {
    fn into_pair(self) -> Option<DexPair> {
        self.pair
            .or_else(|| self.pairs.and_then(|pairs| pairs.into_iter().next()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DexPair {
    #[serde(default)]
    base_token: BaseToken,
    price_usd: Option<Value>,
    fdv: Option<Value>,
    info: Option<PairInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BaseToken {
    name: Option<String>,
    symbol: Option<String>,
    icon_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PairInfo {
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenProfile {
    chain_id: Option<String>,
    token_address: Option<String>,
}

/// Reads a numeric field that the provider sends either as a JSON number or
/// as a decimal string. Absent and null fields count as zero; NaN and
/// infinities are rejected.
fn numeric_field(field: &str, value: Option<&Value>) -> ApiResult<f64> {
    let number = match value {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| ApiError::Parse(format!("{} is not representable as f64", field))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| ApiError::Parse(format!("{} = {:?}: {}", field, s, e))),
        Some(other) => Err(ApiError::Parse(format!("{} has unexpected type: {}", field, other))),
    }?;

    if number.is_finite() {
        Ok(number)
    } else {
        Err(ApiError::Parse(format!("{} is not a finite number: {}", field, number)))
    }
}

impl DexPair {
    fn into_snapshot(self) -> ApiResult<TokenSnapshot> {
        let price = numeric_field("priceUsd", self.price_usd.as_ref())?;
        let fdv = numeric_field("fdv", self.fdv.as_ref())?;
        let logo_url = self
            .base_token
            .icon_url
            .or_else(|| self.info.and_then(|info| info.image_url))
            .filter(|url| !url.trim().is_empty());

        Ok(TokenSnapshot {
            name: self.base_token.name.unwrap_or_else(|| "Unknown".to_string()),
            symbol: self.base_token.symbol.unwrap_or_default(),
            price,
            fdv,
            logo_url,
        })
    }
}

/// Returns the first pool's pair address from a pools-for-token response.
/// Anything other than a non-empty array yields `None`.
fn first_pool_address(pools: &Value) -> Option<String> {
    pools
        .as_array()?
        .first()?
        .get("pairAddress")?
        .as_str()
        .filter(|addr| !addr.is_empty())
        .map(str::to_string)
}

/// Client for the DexScreener public REST API, scoped to one chain.
#[derive(Debug, Clone)]
pub struct DexScreenerClient {
    client: Client,
    base_url: String,
    chain: String,
}

impl DexScreenerClient {
    pub fn new(base_url: impl Into<String>, chain: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            chain: chain.into(),
        })
    }

    pub fn from_config(config: &Config) -> ApiResult<Self> {
        Self::new(
            config.dexscreener_base_url.clone(),
            config.chain.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn lookup_pair(&self, pair_address: &str) -> ApiResult<TokenSnapshot> {
        let response: PairLookupResponse = self
            .get_json(&format!("/latest/dex/pairs/{}/{}", self.chain, pair_address))
            .await?;

        response
            .into_pair()
            .ok_or_else(|| ApiError::NotFound(pair_address.to_string()))?
            .into_snapshot()
    }

    async fn collect_latest_pairs(&self, limit: usize) -> ApiResult<Vec<String>> {
        let profiles: Vec<TokenProfile> = self.get_json("/token-profiles/latest/v1").await?;
        let mut pairs = Vec::with_capacity(limit);

        for profile in profiles {
            if pairs.len() >= limit {
                break;
            }
            if profile.chain_id.as_deref() != Some(self.chain.as_str()) {
                continue;
            }
            let Some(token_address) = profile.token_address else {
                continue;
            };

            let pools: Value = match self
                .get_json(&format!("/token-pairs/v1/{}/{}", self.chain, token_address))
                .await
            {
                Ok(pools) => pools,
                Err(ApiError::Status(404)) => {
                    debug!("Token {} has no pools", token_address);
                    continue;
                }
                Err(e) => return Err(e),
            };
            if let Some(pair_address) = first_pool_address(&pools) {
                debug!("Token {} -> pair {}", token_address, pair_address);
                pairs.push(pair_address);
            }
        }

        Ok(pairs)
    }
}

#[async_trait]
impl PriceSource for DexScreenerClient {
    async fn fetch_token(&self, pair_address: &str) -> ApiResult<TokenSnapshot> {
        match self.lookup_pair(pair_address).await {
            Ok(snapshot) => {
                debug!("Fetched {} ({}) at ${}", snapshot.name, snapshot.symbol, snapshot.price);
                Ok(snapshot)
            }
            Err(e) => {
                warn!("Failed to fetch token info for {}: {}", pair_address, e);
                Err(e)
            }
        }
    }

    async fn fetch_latest_pairs(&self, limit: usize) -> ApiResult<Vec<String>> {
        match self.collect_latest_pairs(limit).await {
            Ok(pairs) => {
                info!("Found {} latest {} pairs", pairs.len(), self.chain);
                Ok(pairs)
            }
            Err(e) => {
                warn!("Failed to fetch latest pairs: {}", e);
                Err(e)
            }
        }
    }
}
