//! API Request Handlers
//!
//! Pipeline for `/risk`:
//! validate address → bytecode check → source fetch → classify →
//! token security (tokens only) → pattern scan → aggregate.
//!
//! Collector failures past validation never fail the request; each one is
//! replaced by its documented default and logged.

use alloy_primitives::Address;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::types::*;
use crate::core::{analyze_source, build_profile, compute_risk, is_token_contract};
use crate::models::config::AppConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{ContractSourceRecord, PatternFindings, RiskMetrics, RiskProfile};
use crate::providers::explorer::bytecode_size;
use crate::providers::{
    DexScreenerClient, ExplorerClient, GovernanceClient, MarketDataClient, TokenSecurityClient,
};
use crate::utils::constants::{looks_like_ethereum_address, APP_VERSION};
use crate::utils::telemetry::{RejectionReason, TelemetryCollector};

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub explorer: ExplorerClient,
    pub token_security: TokenSecurityClient,
    pub dexscreener: DexScreenerClient,
    pub market: MarketDataClient,
    pub governance: GovernanceClient,
    pub telemetry: Arc<TelemetryCollector>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: AppConfig, telemetry: Arc<TelemetryCollector>) -> AppResult<Self> {
        let timeout = config.http_timeout;
        Ok(Self {
            explorer: ExplorerClient::new(config.explorer.clone(), timeout)?,
            token_security: TokenSecurityClient::new(
                config.token_security_url.clone(),
                config.explorer.chain_id,
                timeout,
            )?,
            dexscreener: DexScreenerClient::new(config.dexscreener_url.clone(), timeout)?,
            market: MarketDataClient::new(config.market.clone(), timeout)?,
            governance: GovernanceClient::new(config.governance_url.clone(), timeout)?,
            telemetry,
            start_time: Instant::now(),
            config,
        })
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: APP_VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(
        data,
        start.elapsed().as_secs_f64() * 1000.0,
    ))
}

// ============================================
// Risk Analysis
// ============================================

/// `GET /risk?address=0x...`
pub async fn get_risk(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AddressQuery>, QueryRejection>,
) -> AppResult<Json<RiskMetrics>> {
    let start = Instant::now();

    let address = validate_address(&state, address_param(query).as_deref())?;
    ensure_contract(&state, &address).await?;

    let metrics = score_contract(&state, &address).await;

    let latency = start.elapsed().as_millis() as u64;
    state.telemetry.record_analysis(&metrics, latency);

    info!(
        address = %address,
        contract_risk = metrics.contract_risk,
        security_risk = metrics.security_risk,
        overall_risk = metrics.overall_risk,
        is_token = metrics.details.is_token,
        latency_ms = latency,
        "{} Risk analysis complete: {}",
        metrics.risk_level.emoji(),
        metrics.risk_level.as_str()
    );

    Ok(Json(metrics))
}

/// `GET /v1/risk/profile?address=0x...`
pub async fn get_risk_profile(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AddressQuery>, QueryRejection>,
) -> AppResult<Json<RiskProfile>> {
    let start = Instant::now();

    let address = validate_address(&state, address_param(query).as_deref())?;
    ensure_contract(&state, &address).await?;

    let (metrics, liquidity, market) = tokio::join!(
        score_contract(&state, &address),
        async {
            state
                .dexscreener
                .get_liquidity(&address)
                .await
                .unwrap_or_else(|e| {
                    warn!("⚠️ Liquidity unavailable [{}]: {}", e.code_str(), e.message);
                    None
                })
        },
        async {
            state
                .market
                .get_market_data(&address)
                .await
                .unwrap_or_else(|e| {
                    warn!("⚠️ Market data unavailable [{}]: {}", e.code_str(), e.message);
                    None
                })
        },
    );

    // Space name needs the symbol, so governance runs after the first wave
    let symbol = market
        .as_ref()
        .and_then(|m| m.symbol.clone())
        .or_else(|| liquidity.as_ref().and_then(|l| l.symbol.clone()));

    let governance = match symbol {
        Some(symbol) => state
            .governance
            .get_governance(&symbol)
            .await
            .unwrap_or_else(|e| {
                warn!("⚠️ Governance unavailable [{}]: {}", e.code_str(), e.message);
                None
            }),
        None => None,
    };

    let latency = start.elapsed().as_millis() as u64;
    state.telemetry.record_analysis(&metrics, latency);
    state.telemetry.record_profile();

    let profile = build_profile(metrics, liquidity, market, governance);

    info!(
        address = %address,
        overall_risk = profile.overall_risk,
        liquidity_risk = profile.liquidity_risk,
        market_risk = profile.market_risk,
        latency_ms = latency,
        "{} Risk profile complete: {}",
        profile.risk_level.emoji(),
        profile.risk_level.as_str()
    );

    Ok(Json(profile))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();
    let stats = state.telemetry.get_stats();

    let data = StatsData {
        total_analyzed: stats.total_analyzed,
        high_risk_detected: stats.high_risk_detected,
        tokens_analyzed: stats.tokens_analyzed,
        unverified_contracts: stats.unverified_contracts,
        rejected_requests: stats.rejected_requests,
        not_contract_rejections: stats.not_contract_rejections,
        rate_limited_requests: stats.rate_limited_requests,
        profiles_generated: stats.profiles_generated,
        avg_latency_ms: stats.avg_latency_ms,
        period_start: stats.period_start,
        uptime_seconds: state.uptime_seconds(),
        api_version: APP_VERSION.to_string(),
    };

    Json(ApiResponse::success(
        data,
        start.elapsed().as_secs_f64() * 1000.0,
    ))
}

// ============================================
// Pipeline steps
// ============================================

/// A query string that does not deserialize counts as a missing address
fn address_param(query: Result<Query<AddressQuery>, QueryRejection>) -> Option<String> {
    match query {
        Ok(Query(query)) => query.address,
        Err(rejection) => {
            warn!("⚠️ Malformed query string: {}", rejection.body_text());
            None
        }
    }
}

/// Present, non-empty and in Ethereum form; returns the lowercase address
fn validate_address(state: &AppState, raw: Option<&str>) -> AppResult<String> {
    let Some(raw) = raw.map(str::trim).filter(|a| !a.is_empty()) else {
        state.telemetry.record_rejection(RejectionReason::MissingAddress);
        return Err(AppError::missing_address());
    };

    let parsed = if looks_like_ethereum_address(raw) {
        Address::from_str(raw).ok()
    } else {
        None
    };

    match parsed {
        Some(address) => Ok(address.to_string().to_lowercase()),
        None => {
            state.telemetry.record_rejection(RejectionReason::NotEthereum);
            warn!("🚫 Rejected non-Ethereum address: {}", raw);
            Err(AppError::not_ethereum(raw))
        }
    }
}

/// Reject EOAs. A failed bytecode lookup is treated as "contract".
async fn ensure_contract(state: &AppState, address: &str) -> AppResult<()> {
    match state.explorer.get_bytecode(address).await {
        Ok(code) if bytecode_size(&code) == 0 => {
            state.telemetry.record_rejection(RejectionReason::NotContract);
            info!("🚫 {} has no bytecode (EOA)", address);
            Err(AppError::not_contract(address))
        }
        Ok(code) => {
            info!("📦 {} bytecode size: {} bytes", address, bytecode_size(&code));
            Ok(())
        }
        Err(e) => {
            warn!(
                "⚠️ Bytecode lookup failed for {} [{}]: {}, assuming contract",
                address,
                e.code_str(),
                e.message
            );
            Ok(())
        }
    }
}

/// Source → classify → token security → patterns → aggregate. Never fails.
async fn score_contract(state: &AppState, address: &str) -> RiskMetrics {
    let (record, findings) = match state.explorer.fetch_source(address).await {
        Ok(record) => {
            let findings = analyze_source(&record.source_code_text);
            (record, findings)
        }
        Err(e) => {
            warn!(
                "⚠️ Source lookup failed for {} [{}]: {}",
                address,
                e.code_str(),
                e.message
            );
            (
                ContractSourceRecord::unverified(),
                PatternFindings::unavailable(&e.message),
            )
        }
    };

    let is_token = is_token_contract(&record.source_code_text);

    let token_security = if is_token {
        state
            .token_security
            .fetch(address)
            .await
            .unwrap_or_else(|e| {
                warn!(
                    "⚠️ Token security unavailable for {} [{}]: {}",
                    address,
                    e.code_str(),
                    e.message
                );
                None
            })
    } else {
        None
    };

    compute_risk(&record, &findings, token_security.as_ref(), is_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(AppConfig::default(), Arc::new(TelemetryCollector::new())).unwrap()
    }

    #[tokio::test]
    async fn test_validate_address() {
        let state = state();

        let ok = validate_address(&state, Some(" 0xdAC17F958D2ee523a2206206994597C13D831ec7 "))
            .unwrap();
        assert_eq!(ok, "0xdac17f958d2ee523a2206206994597c13d831ec7");

        assert!(validate_address(&state, None).is_err());
        assert!(validate_address(&state, Some("")).is_err());
        assert!(validate_address(&state, Some("dAC17F958D2ee523a2206206994597C13D831ec7")).is_err());
        assert!(validate_address(&state, Some("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v")).is_err());

        let stats = state.telemetry.get_stats();
        assert_eq!(stats.rejected_requests, 4);
    }
}
