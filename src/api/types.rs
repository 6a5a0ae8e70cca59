//! API Request/Response Types
//!
//! `/risk` and `/v1/risk/profile` return their payload bare; the operational
//! endpoints use the `ApiResponse` envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data,
            latency_ms,
            timestamp: Utc::now().timestamp(),
        }
    }
}

/// `?address=...`
#[derive(Debug, Default, Deserialize)]
pub struct AddressQuery {
    pub address: Option<String>,
}

// ============================================
// Health & Stats
// ============================================

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
pub struct StatsData {
    pub total_analyzed: u64,
    pub high_risk_detected: u64,
    pub tokens_analyzed: u64,
    pub unverified_contracts: u64,
    pub rejected_requests: u64,
    pub not_contract_rejections: u64,
    pub rate_limited_requests: u64,
    pub profiles_generated: u64,
    pub avg_latency_ms: f64,
    pub period_start: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub api_version: String,
}
