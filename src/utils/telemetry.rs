//! Telemetry Module
//!
//! In-memory analysis counters backing `GET /v1/stats`.
//! No addresses are stored, only aggregate counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::types::RiskMetrics;
use crate::utils::constants::HIGH_RISK_THRESHOLD;

/// Why a request never reached scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    MissingAddress,
    NotEthereum,
    NotContract,
    RateLimited,
}

/// Aggregated statistics snapshot
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelemetryStats {
    /// Completed risk analyses
    pub total_analyzed: u64,
    /// Analyses with `overallRisk >= 0.7`
    pub high_risk_detected: u64,
    pub tokens_analyzed: u64,
    pub unverified_contracts: u64,
    /// Requests rejected before scoring
    pub rejected_requests: u64,
    pub not_contract_rejections: u64,
    /// 429s from the per-client rate limiter
    pub rate_limited_requests: u64,
    pub profiles_generated: u64,
    pub avg_latency_ms: f64,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

/// Lock-free collector shared by all handlers
pub struct TelemetryCollector {
    total_analyzed: AtomicU64,
    high_risk_detected: AtomicU64,
    tokens_analyzed: AtomicU64,
    unverified_contracts: AtomicU64,
    rejected_requests: AtomicU64,
    not_contract_rejections: AtomicU64,
    rate_limited_requests: AtomicU64,
    profiles_generated: AtomicU64,
    total_latency_ms: AtomicU64,
    session_start: DateTime<Utc>,
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self {
            total_analyzed: AtomicU64::new(0),
            high_risk_detected: AtomicU64::new(0),
            tokens_analyzed: AtomicU64::new(0),
            unverified_contracts: AtomicU64::new(0),
            rejected_requests: AtomicU64::new(0),
            not_contract_rejections: AtomicU64::new(0),
            rate_limited_requests: AtomicU64::new(0),
            profiles_generated: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            session_start: Utc::now(),
        }
    }

    /// Record a completed analysis
    pub fn record_analysis(&self, metrics: &RiskMetrics, latency_ms: u64) {
        self.total_analyzed.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);

        if metrics.overall_risk >= HIGH_RISK_THRESHOLD {
            self.high_risk_detected.fetch_add(1, Ordering::Relaxed);
        }
        if metrics.details.is_token {
            self.tokens_analyzed.fetch_add(1, Ordering::Relaxed);
        }
        if !metrics.details.verified {
            self.unverified_contracts.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a multi-factor profile on top of its analysis
    pub fn record_profile(&self) {
        self.profiles_generated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejection(&self, reason: RejectionReason) {
        self.rejected_requests.fetch_add(1, Ordering::Relaxed);
        match reason {
            RejectionReason::NotContract => {
                self.not_contract_rejections.fetch_add(1, Ordering::Relaxed);
            }
            RejectionReason::RateLimited => {
                self.rate_limited_requests.fetch_add(1, Ordering::Relaxed);
            }
            RejectionReason::MissingAddress | RejectionReason::NotEthereum => {}
        }
    }

    pub fn get_stats(&self) -> TelemetryStats {
        let total_analyzed = self.total_analyzed.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        let avg_latency = if total_analyzed > 0 {
            total_latency as f64 / total_analyzed as f64
        } else {
            0.0
        };

        TelemetryStats {
            total_analyzed,
            high_risk_detected: self.high_risk_detected.load(Ordering::Relaxed),
            tokens_analyzed: self.tokens_analyzed.load(Ordering::Relaxed),
            unverified_contracts: self.unverified_contracts.load(Ordering::Relaxed),
            rejected_requests: self.rejected_requests.load(Ordering::Relaxed),
            not_contract_rejections: self.not_contract_rejections.load(Ordering::Relaxed),
            rate_limited_requests: self.rate_limited_requests.load(Ordering::Relaxed),
            profiles_generated: self.profiles_generated.load(Ordering::Relaxed),
            avg_latency_ms: avg_latency,
            period_start: self.session_start,
            period_end: Utc::now(),
        }
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}
