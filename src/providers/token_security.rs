//! Token Security Oracle Client (GoPlus compatible)
//!
//! API: `{base}/token_security/{chain_id}?contract_addresses={address}`
//!
//! The oracle encodes every flag as a string (`"1"`, `"0"` or absent) and
//! taxes as fractional strings (`"0.05"` = 5%). Conversion to real values
//! happens here and nowhere else.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::models::errors::{AppError, AppResult};
use crate::models::types::TokenSecurityRecord;
use crate::providers::build_http_client;

/// Raw oracle envelope
#[derive(Debug, Deserialize)]
pub struct TokenSecurityResponse {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: Option<HashMap<String, HashMap<String, Value>>>,
}

#[derive(Clone)]
pub struct TokenSecurityClient {
    client: reqwest::Client,
    base_url: String,
    chain_id: u64,
}

impl TokenSecurityClient {
    pub fn new(base_url: impl Into<String>, chain_id: u64, timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url.into(),
            chain_id,
        })
    }

    /// `Ok(None)` when the oracle has no entry for the token
    pub async fn fetch(&self, address: &str) -> AppResult<Option<TokenSecurityRecord>> {
        let url = format!("{}/token_security/{}", self.base_url, self.chain_id);
        info!("🛡️ Token security: checking {}", address);

        let response = self
            .client
            .get(&url)
            .query(&[("contract_addresses", address)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::token_security_error(format!(
                "Token security HTTP error: {}",
                response.status()
            )));
        }

        let body: TokenSecurityResponse = response.json().await?;
        let record = parse_token_security(&body, address)?;
        debug!("Token security for {}: {:?}", address, record);
        Ok(record)
    }
}

/// Pick the entry for `address` (keys are lowercase) and convert it
pub fn parse_token_security(
    body: &TokenSecurityResponse,
    address: &str,
) -> AppResult<Option<TokenSecurityRecord>> {
    if body.code != 1 {
        return Err(AppError::token_security_error(format!(
            "Token security oracle error {}: {}",
            body.code, body.message
        )));
    }

    let Some(result) = &body.result else {
        return Ok(None);
    };

    let key = address.to_lowercase();
    let entry = result
        .get(&key)
        .or_else(|| result.iter().find(|(k, _)| k.eq_ignore_ascii_case(address)).map(|(_, v)| v));

    Ok(entry.map(record_from_fields))
}

fn record_from_fields(fields: &HashMap<String, Value>) -> TokenSecurityRecord {
    let flag = |name: &str| fields.get(name).is_some_and(is_set);

    TokenSecurityRecord {
        is_honeypot: flag("is_honeypot"),
        is_blacklisted: flag("is_blacklisted"),
        is_mintable: flag("is_mintable"),
        is_proxy: flag("is_proxy"),
        is_scam: flag("is_airdrop_scam"),
        is_high_risk: flag("hidden_owner")
            || flag("can_take_back_ownership")
            || flag("owner_change_balance"),
        cannot_sell_all: flag("cannot_sell_all"),
        buy_tax_percent: tax_percent(fields.get("buy_tax")),
        sell_tax_percent: tax_percent(fields.get("sell_tax")),
    }
}

fn is_set(value: &Value) -> bool {
    match value {
        Value::String(s) => s.trim() == "1",
        Value::Number(n) => n.as_i64() == Some(1),
        Value::Bool(b) => *b,
        _ => false,
    }
}

/// `"0.05"` → 5.0, rounded to two decimals; absent or malformed → 0.0
fn tax_percent(value: Option<&Value>) -> f64 {
    let fraction = match value {
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        _ => 0.0,
    };
    if fraction.is_finite() {
        ((fraction * 100.0 * 100.0).round() / 100.0).max(0.0)
    } else {
        0.0
    }
}
