//! DexScreener API Client
//!
//! Liquidity discovery for the risk profile: finds the deepest Ethereum pair
//! for a token and reports its USD liquidity and 24h volume.
//!
//! DexScreener data lags 5-30 seconds; fine for a liquidity tier, not for
//! anything price-sensitive.
//!
//! API: `{base}/tokens/{tokenAddress}`, free, no API key required

use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::models::errors::{AppError, AppResult};
use crate::models::types::LiquiditySnapshot;
use crate::providers::build_http_client;
use crate::utils::constants::DEXSCREENER_CHAIN_ETHEREUM;

/// DexScreener API response
#[derive(Debug, Deserialize)]
pub struct DexScreenerResponse {
    #[serde(default)]
    pub pairs: Option<Vec<DexPair>>,
}

/// A trading pair from DexScreener
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DexPair {
    /// e.g. "ethereum", "bsc"
    pub chain_id: String,
    /// e.g. "uniswap", "sushiswap"
    pub dex_id: String,
    pub pair_address: String,
    pub base_token: DexToken,
    pub liquidity: Option<DexLiquidity>,
    pub price_usd: Option<String>,
    pub volume: Option<DexVolume>,
}

impl DexPair {
    pub fn liquidity_usd(&self) -> f64 {
        self.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0)
    }

    pub fn volume_24h_usd(&self) -> f64 {
        self.volume.as_ref().and_then(|v| v.h24).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DexToken {
    pub address: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DexLiquidity {
    pub usd: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DexVolume {
    pub h24: Option<f64>,
}

/// DexScreener API client
#[derive(Clone)]
pub struct DexScreenerClient {
    client: reqwest::Client,
    base_url: String,
}

impl DexScreenerClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url.into(),
        })
    }

    /// Fetch all pairs for a token address
    pub async fn get_token_pairs(&self, token_address: &str) -> AppResult<Vec<DexPair>> {
        let url = format!("{}/tokens/{}", self.base_url, token_address);

        info!("🔍 DexScreener: Fetching pairs for {}", token_address);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::dexscreener_error(format!(
                "DexScreener API error: {}",
                response.status()
            )));
        }

        let data: DexScreenerResponse = response.json().await?;
        let pairs = data.pairs.unwrap_or_default();

        info!("📊 DexScreener: Found {} pairs", pairs.len());

        Ok(pairs)
    }

    /// Liquidity snapshot for the token on Ethereum; `Ok(None)` when it has
    /// no Ethereum pair at all
    pub async fn get_liquidity(&self, token_address: &str) -> AppResult<Option<LiquiditySnapshot>> {
        let pairs = self.get_token_pairs(token_address).await?;
        let snapshot = summarize_pairs(&pairs);
        if snapshot.is_none() {
            warn!("⚠️ DexScreener: no Ethereum pairs for {}", token_address);
        }
        Ok(snapshot)
    }
}

/// Best Ethereum pair by USD liquidity, plus the number of Ethereum pairs
pub fn summarize_pairs(pairs: &[DexPair]) -> Option<LiquiditySnapshot> {
    let on_chain: Vec<&DexPair> = pairs
        .iter()
        .filter(|p| p.chain_id.eq_ignore_ascii_case(DEXSCREENER_CHAIN_ETHEREUM))
        .collect();

    let best = on_chain.iter().max_by(|a, b| {
        a.liquidity_usd()
            .partial_cmp(&b.liquidity_usd())
            .unwrap_or(std::cmp::Ordering::Equal)
    })?;

    Some(LiquiditySnapshot {
        liquidity_usd: best.liquidity_usd(),
        volume_24h_usd: best.volume_24h_usd(),
        price_usd: best.price_usd.as_deref().and_then(|p| p.parse().ok()),
        pair_count: on_chain.len(),
        dex_id: Some(best.dex_id.clone()),
        symbol: best.base_token.symbol.clone(),
    })
}
