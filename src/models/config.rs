//! Runtime configuration
//!
//! Read once at startup from the environment. Defaults live in
//! `utils::constants`; API keys are never logged.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{
    CHAIN_ID_ETHEREUM, DEFAULT_DEXSCREENER_BASE_URL, DEFAULT_ETHERSCAN_BASE_URL,
    DEFAULT_GOVERNANCE_GRAPHQL_URL, DEFAULT_HOST, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_MARKET_DATA_BASE_URL, DEFAULT_MARKET_RETRY_DELAY_MS, DEFAULT_PORT,
    DEFAULT_RATE_LIMIT_PER_MINUTE, DEFAULT_TOKEN_SECURITY_BASE_URL,
};

/// Block explorer settings
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub chain_id: u64,
}

/// Market data settings
#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub retry_delay: Duration,
}

/// Top-level service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub explorer: ExplorerConfig,
    pub token_security_url: String,
    pub dexscreener_url: String,
    pub market: MarketConfig,
    pub governance_url: String,
    pub http_timeout: Duration,
    pub rate_limit_per_minute: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            explorer: ExplorerConfig {
                base_url: DEFAULT_ETHERSCAN_BASE_URL.to_string(),
                api_key: None,
                chain_id: CHAIN_ID_ETHEREUM,
            },
            token_security_url: DEFAULT_TOKEN_SECURITY_BASE_URL.to_string(),
            dexscreener_url: DEFAULT_DEXSCREENER_BASE_URL.to_string(),
            market: MarketConfig {
                base_url: DEFAULT_MARKET_DATA_BASE_URL.to_string(),
                api_key: None,
                retry_delay: Duration::from_millis(DEFAULT_MARKET_RETRY_DELAY_MS),
            },
            governance_url: DEFAULT_GOVERNANCE_GRAPHQL_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
        }
    }
}

impl AppConfig {
    /// Load from process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let port = get("PORT")
            .or_else(|| get("RISK_PORT"))
            .map(|raw| parse_or_default("PORT", &raw, defaults.port))
            .unwrap_or(defaults.port);

        let explorer_key = get("ETHERSCAN_API_KEY").filter(|k| k != "YOUR_API_KEY");
        if explorer_key.is_some() {
            info!("🔑 ETHERSCAN_API_KEY configured (key hidden)");
        } else {
            warn!("⚠️ ETHERSCAN_API_KEY not set, explorer lookups will be rate limited");
        }

        let chain_id = get("CHAIN_ID")
            .map(|raw| parse_or_default("CHAIN_ID", &raw, CHAIN_ID_ETHEREUM))
            .unwrap_or(CHAIN_ID_ETHEREUM);

        let retry_delay_ms = get("MARKET_RETRY_DELAY_MS")
            .map(|raw| parse_or_default("MARKET_RETRY_DELAY_MS", &raw, DEFAULT_MARKET_RETRY_DELAY_MS))
            .unwrap_or(DEFAULT_MARKET_RETRY_DELAY_MS);

        let timeout_secs = get("HTTP_TIMEOUT_SECS")
            .map(|raw| parse_or_default("HTTP_TIMEOUT_SECS", &raw, DEFAULT_HTTP_TIMEOUT_SECS))
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        let rate_limit = get("RATE_LIMIT_PER_MINUTE")
            .map(|raw| parse_or_default("RATE_LIMIT_PER_MINUTE", &raw, DEFAULT_RATE_LIMIT_PER_MINUTE))
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_RATE_LIMIT_PER_MINUTE);

        Self {
            host: get("RISK_HOST").unwrap_or(defaults.host),
            port,
            explorer: ExplorerConfig {
                base_url: get("ETHERSCAN_BASE_URL").unwrap_or(defaults.explorer.base_url),
                api_key: explorer_key,
                chain_id,
            },
            token_security_url: get("TOKEN_SECURITY_BASE_URL")
                .unwrap_or(defaults.token_security_url),
            dexscreener_url: get("DEXSCREENER_BASE_URL").unwrap_or(defaults.dexscreener_url),
            market: MarketConfig {
                base_url: get("MARKET_DATA_BASE_URL").unwrap_or(defaults.market.base_url),
                api_key: get("COINGECKO_API_KEY"),
                retry_delay: Duration::from_millis(retry_delay_ms),
            },
            governance_url: get("GOVERNANCE_GRAPHQL_URL").unwrap_or(defaults.governance_url),
            http_timeout: Duration::from_secs(timeout_secs),
            rate_limit_per_minute: rate_limit,
        }
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> AppResult<SocketAddr> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .map_err(|_| AppError::invalid_config("RISK_HOST", &self.host))
    }
}

fn parse_or_default<T>(key: &str, raw: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
{
    match raw.parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            warn!(
                "⚠️ Invalid value for {}: {:?}, using default {}",
                key, raw, default
            );
            default
        }
    }
}
