//! Block Explorer Client (Etherscan v2 compatible)
//!
//! Three lookups, all `GET {base}?chainid=..&module=..&action=..`:
//! - `proxy/eth_getCode`                  → deployed bytecode (EOA check)
//! - `contract/getsourcecode`             → verified source + compiler metadata
//! - `contract/getcontractcreation`       → creation timestamp (protocol age)
//!
//! Explorer errors come back as HTTP 200 with `status: "0"` and a string
//! `result`, so every payload is inspected before use.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::models::config::ExplorerConfig;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::ContractSourceRecord;
use crate::providers::build_http_client;
use crate::utils::constants::SECONDS_PER_YEAR;

/// Etherscan-compatible explorer client
#[derive(Clone)]
pub struct ExplorerClient {
    client: reqwest::Client,
    config: ExplorerConfig,
}

impl ExplorerClient {
    pub fn new(config: ExplorerConfig, timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            config,
        })
    }

    /// Deployed bytecode as a `0x` hex string (`"0x"` for an EOA)
    pub async fn get_bytecode(&self, address: &str) -> AppResult<String> {
        debug!("🔍 Explorer: eth_getCode {}", address);
        let payload = self
            .get(&[
                ("module", "proxy"),
                ("action", "eth_getCode"),
                ("address", address),
                ("tag", "latest"),
            ])
            .await?;
        parse_bytecode_response(&payload)
    }

    /// Verified source and metadata. Unverified contracts are `Ok` with
    /// `verified == false`; throttling and outages are `Err`.
    pub async fn fetch_source(&self, address: &str) -> AppResult<ContractSourceRecord> {
        info!("📜 Explorer: fetching source for {}", address);
        let payload = self
            .get(&[
                ("module", "contract"),
                ("action", "getsourcecode"),
                ("address", address),
            ])
            .await?;
        let mut record = parse_source_response(&payload)?;

        match self.fetch_creation_time(address).await {
            Ok(Some(created_at)) => {
                record.protocol_age_years = protocol_age_years(created_at, Utc::now());
            }
            Ok(None) => debug!("Explorer: no creation timestamp for {}", address),
            Err(e) => warn!(
                "⚠️ Explorer: creation lookup failed for {} [{}]: {}",
                address,
                e.code_str(),
                e.message
            ),
        }

        info!(
            "📜 Explorer: {} verified={} name={:?} compiler={:?}",
            address, record.verified, record.contract_name, record.compiler_version
        );
        Ok(record)
    }

    /// Contract creation time, if the explorer reports one
    pub async fn fetch_creation_time(&self, address: &str) -> AppResult<Option<DateTime<Utc>>> {
        let payload = self
            .get(&[
                ("module", "contract"),
                ("action", "getcontractcreation"),
                ("contractaddresses", address),
            ])
            .await?;
        parse_creation_response(&payload)
    }

    async fn get(&self, params: &[(&str, &str)]) -> AppResult<Value> {
        let chain_id = self.config.chain_id.to_string();
        let mut request = self
            .client
            .get(&self.config.base_url)
            .query(&[("chainid", chain_id.as_str())])
            .query(params);
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("apikey", key.as_str())]);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AppError::explorer_rate_limited("Explorer rate limited (HTTP 429)"));
        }
        if !status.is_success() {
            return Err(AppError::explorer_error(format!("Explorer HTTP error: {}", status)));
        }

        Ok(response.json::<Value>().await?)
    }
}

// ============================================
// Payload parsing
// ============================================

/// Throttling and key problems all surface as plain strings
pub fn is_rate_limit_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("rate limit") || lower.contains("api key") || lower.contains("too many")
}

fn explorer_failure(message: &str) -> AppError {
    if is_rate_limit_message(message) {
        AppError::explorer_rate_limited(message)
    } else {
        AppError::explorer_error(message)
    }
}

/// `{"jsonrpc":"2.0","result":"0x..."}`, or a `status: "0"` envelope on failure
pub fn parse_bytecode_response(payload: &Value) -> AppResult<String> {
    if let Some(message) = payload
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
    {
        return Err(explorer_failure(message));
    }

    let result = payload
        .get("result")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            AppError::new(ErrorCode::UpstreamInvalidResponse, "eth_getCode: missing result")
        })?;

    let Some(body) = result.strip_prefix("0x") else {
        return Err(explorer_failure(result));
    };
    if hex::decode(body).is_err() {
        return Err(AppError::new(
            ErrorCode::UpstreamInvalidResponse,
            "eth_getCode: result is not valid hex",
        ));
    }

    Ok(result.to_string())
}

/// Size in bytes of a `0x` hex bytecode string
pub fn bytecode_size(code: &str) -> usize {
    let body = code.strip_prefix("0x").unwrap_or(code);
    hex::decode(body).map(|bytes| bytes.len()).unwrap_or(0)
}

/// Parse `getsourcecode`. Protocol age is left at 0.0.
pub fn parse_source_response(payload: &Value) -> AppResult<ContractSourceRecord> {
    let status = payload.get("status").and_then(Value::as_str).unwrap_or("0");
    let result = payload.get("result");

    if status != "1" {
        let message = result
            .and_then(Value::as_str)
            .or_else(|| payload.get("message").and_then(Value::as_str))
            .unwrap_or("unknown explorer error");
        return Err(explorer_failure(message));
    }

    let entry = result
        .and_then(Value::as_array)
        .and_then(|entries| entries.first())
        .ok_or_else(|| {
            AppError::new(ErrorCode::UpstreamInvalidResponse, "getsourcecode: empty result")
        })?;

    let field = |name: &str| entry.get(name).and_then(Value::as_str).unwrap_or("").to_string();

    let source = flatten_source(&field("SourceCode"));
    if source.trim().is_empty() {
        return Ok(ContractSourceRecord::unverified());
    }

    Ok(ContractSourceRecord {
        verified: true,
        source_code_text: source,
        compiler_version: field("CompilerVersion"),
        optimization_enabled: field("OptimizationUsed") == "1",
        protocol_age_years: 0.0,
        contract_name: field("ContractName"),
    })
}

/// Multi-file submissions arrive as JSON (`{{ standard input }}` or
/// `{ "File.sol": { "content": .. } }`); concatenate every file's content.
pub fn flatten_source(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with('{') {
        return raw.to_string();
    }

    let json_text = if trimmed.starts_with("{{") && trimmed.ends_with("}}") {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    let Ok(parsed) = serde_json::from_str::<Value>(json_text) else {
        return raw.to_string();
    };

    let files = parsed.get("sources").unwrap_or(&parsed);
    let Some(files) = files.as_object() else {
        return raw.to_string();
    };

    let contents: Vec<&str> = files
        .values()
        .filter_map(|file| file.get("content").and_then(Value::as_str))
        .collect();

    if contents.is_empty() {
        raw.to_string()
    } else {
        contents.join("\n")
    }
}

/// `getcontractcreation` → creation time from the first entry's `timestamp`
pub fn parse_creation_response(payload: &Value) -> AppResult<Option<DateTime<Utc>>> {
    let status = payload.get("status").and_then(Value::as_str).unwrap_or("0");
    if status != "1" {
        let message = payload
            .get("result")
            .and_then(Value::as_str)
            .or_else(|| payload.get("message").and_then(Value::as_str))
            .unwrap_or("unknown explorer error");
        // "No data found" just means the explorer has no creation record
        if message.to_lowercase().contains("no data") {
            return Ok(None);
        }
        return Err(explorer_failure(message));
    }

    let timestamp = payload
        .get("result")
        .and_then(Value::as_array)
        .and_then(|entries| entries.first())
        .and_then(|entry| entry.get("timestamp"))
        .and_then(|ts| match ts {
            Value::String(s) => s.parse::<i64>().ok(),
            Value::Number(n) => n.as_i64(),
            _ => None,
        });

    Ok(timestamp.and_then(|secs| Utc.timestamp_opt(secs, 0).single()))
}

/// Years between creation and `now`, never negative
pub fn protocol_age_years(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let seconds = (now - created_at).num_seconds().max(0);
    seconds as f64 / SECONDS_PER_YEAR
}
