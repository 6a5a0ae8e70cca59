//! Market Data Client (CoinGecko compatible)
//!
//! API: `{base}/coins/ethereum/contract/{address}`
//!
//! Public CoinGecko throttles aggressively, so an HTTP 429 gets exactly one
//! retry after the configured delay plus random jitter. Everything else
//! fails straight through to the caller.

use rand::Rng;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::models::config::MarketConfig;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::MarketSnapshot;
use crate::providers::build_http_client;
use crate::utils::constants::MARKET_RETRY_JITTER_MS;

const API_KEY_HEADER: &str = "x-cg-demo-api-key";

#[derive(Debug, Deserialize)]
pub struct CoinResponse {
    pub symbol: Option<String>,
    pub market_data: Option<CoinMarketData>,
}

#[derive(Debug, Deserialize)]
pub struct CoinMarketData {
    pub market_cap: Option<UsdValue>,
    pub total_volume: Option<UsdValue>,
    pub price_change_percentage_24h: Option<f64>,
    pub price_change_percentage_7d: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UsdValue {
    pub usd: Option<f64>,
}

#[derive(Clone)]
pub struct MarketDataClient {
    client: reqwest::Client,
    config: MarketConfig,
}

impl MarketDataClient {
    pub fn new(config: MarketConfig, timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            config,
        })
    }

    /// Market snapshot for an Ethereum token; `Ok(None)` when unlisted
    pub async fn get_market_data(&self, address: &str) -> AppResult<Option<MarketSnapshot>> {
        info!("💹 Market data: fetching {}", address);

        match self.fetch_once(address).await {
            Err(e) if e.code == ErrorCode::MarketDataRateLimited => {
                let delay = retry_delay(self.config.retry_delay);
                warn!(
                    "⏳ Market data rate limited (HTTP 429), retrying once in {}ms",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                self.fetch_once(address).await
            }
            other => other,
        }
    }

    async fn fetch_once(&self, address: &str) -> AppResult<Option<MarketSnapshot>> {
        let url = format!(
            "{}/coins/ethereum/contract/{}",
            self.config.base_url,
            address.to_lowercase()
        );

        let mut request = self.client.get(&url);
        if let Some(key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.as_u16() == 429 {
            return Err(AppError::market_data_rate_limited());
        }
        if status.as_u16() == 404 {
            debug!("Market data: {} not listed", address);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::market_data_error(format!(
                "Market data HTTP error: {}",
                status
            )));
        }

        let coin: CoinResponse = response.json().await?;
        Ok(Some(snapshot_from(coin)))
    }
}

/// Base delay plus 0..=jitter milliseconds
fn retry_delay(base: Duration) -> Duration {
    let jitter = rand::thread_rng().gen_range(0..=MARKET_RETRY_JITTER_MS);
    base + Duration::from_millis(jitter)
}

pub fn snapshot_from(coin: CoinResponse) -> MarketSnapshot {
    let data = coin.market_data;
    let usd = |value: Option<&UsdValue>| value.and_then(|v| v.usd);

    MarketSnapshot {
        symbol: coin.symbol.map(|s| s.to_uppercase()),
        market_cap_usd: usd(data.as_ref().and_then(|d| d.market_cap.as_ref()))
            .filter(|cap| *cap > 0.0),
        volume_24h_usd: usd(data.as_ref().and_then(|d| d.total_volume.as_ref())),
        price_change_24h_percent: data.as_ref().and_then(|d| d.price_change_percentage_24h),
        price_change_7d_percent: data.as_ref().and_then(|d| d.price_change_percentage_7d),
    }
}
