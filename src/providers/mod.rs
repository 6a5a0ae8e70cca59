//! Providers Module - External Data Collectors
//!
//! One client per upstream. Each collector applies the configured timeout and
//! reports failures as `AppError`; the route layer decides the fallback.

pub mod dexscreener;
pub mod explorer;
pub mod governance;
pub mod market;
pub mod token_security;

pub use dexscreener::DexScreenerClient;
pub use explorer::ExplorerClient;
pub use governance::GovernanceClient;
pub use market::MarketDataClient;
pub use token_security::TokenSecurityClient;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, USER_AGENT};
use std::time::Duration;

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::USER_AGENT as USER_AGENT_CONST;

/// Shared HTTP client: JSON, gzip, fixed User-Agent, per-request timeout
pub fn build_http_client(timeout: Duration) -> AppResult<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .gzip(true)
        .build()
        .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))
}
