//! Type definitions for Ruster Risk
//! Core data structures shared by the analyzers, the aggregator and the API

use serde::{Deserialize, Serialize};

/// Risk level label derived from a 0.0-1.0 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// Below 0.2
    Safe,
    /// 0.2 - 0.4
    Low,
    /// 0.4 - 0.6
    Medium,
    /// 0.6 - 0.8
    High,
    /// 0.8 and above
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            RiskLevel::Critical
        } else if score >= 0.6 {
            RiskLevel::High
        } else if score >= 0.4 {
            RiskLevel::Medium
        } else if score >= 0.2 {
            RiskLevel::Low
        } else {
            RiskLevel::Safe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "SAFE",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "✅",
            RiskLevel::Low => "🟡",
            RiskLevel::Medium => "🟠",
            RiskLevel::High => "🔴",
            RiskLevel::Critical => "💀",
        }
    }
}

/// Contract metadata as reported by the block explorer.
/// Built once per request, never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractSourceRecord {
    pub verified: bool,
    /// Raw Solidity source (empty when unverified)
    pub source_code_text: String,
    /// e.g. "v0.8.19+commit.7dd6d404"
    pub compiler_version: String,
    pub optimization_enabled: bool,
    /// Years since contract creation (0.0 when unknown)
    pub protocol_age_years: f64,
    pub contract_name: String,
}

impl ContractSourceRecord {
    /// Record used whenever no source could be obtained
    pub fn unverified() -> Self {
        Self::default()
    }

    /// Parse `(major, minor)` out of the compiler version string
    pub fn compiler_semver(&self) -> Option<(u32, u32)> {
        let version = self.compiler_version.trim().trim_start_matches('v');
        let core = version.split(['+', '-']).next()?;
        let mut parts = core.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        Some((major, minor))
    }
}

/// Output of the source pattern analyzer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternFindings {
    pub has_self_destruct: bool,
    pub has_delegate_call: bool,
    pub has_unchecked_math: bool,
    pub has_reentrancy_risk: bool,
    pub has_access_control: bool,
    pub has_pausable: bool,
    pub critical_vulnerabilities: Vec<String>,
    pub major_risks: Vec<String>,
    pub minor_risks: Vec<String>,
}

/// Prefix marking a findings entry that records an analysis failure
/// rather than a detected pattern
pub const ANALYSIS_UNAVAILABLE_PREFIX: &str = "Analysis unavailable";

impl PatternFindings {
    /// Findings for a contract whose source could not be fetched at all
    /// (explorer rate limit, bad key, outage)
    pub fn unavailable(reason: &str) -> Self {
        Self {
            minor_risks: vec![format!("{}: {}", ANALYSIS_UNAVAILABLE_PREFIX, reason)],
            ..Self::default()
        }
    }

    /// True when any severity list carries an analysis-unavailable marker
    pub fn indicates_analysis_failure(&self) -> bool {
        self.critical_vulnerabilities
            .iter()
            .chain(&self.major_risks)
            .chain(&self.minor_risks)
            .any(|entry| entry.starts_with(ANALYSIS_UNAVAILABLE_PREFIX))
    }
}

/// Token security flags from the oracle, already converted from the
/// oracle's "1"/"0" strings into real values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSecurityRecord {
    pub is_honeypot: bool,
    pub is_blacklisted: bool,
    pub is_mintable: bool,
    pub is_proxy: bool,
    pub is_scam: bool,
    pub is_high_risk: bool,
    pub cannot_sell_all: bool,
    /// Buy tax in percent (5.0 = 5%)
    pub buy_tax_percent: f64,
    /// Sell tax in percent
    pub sell_tax_percent: f64,
}

/// Details payload of [`RiskMetrics`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskDetails {
    pub verified: bool,
    pub contract_name: String,
    pub compiler_version: String,
    pub optimization_enabled: bool,
    pub protocol_age_years: f64,
    pub code_quality: f64,
    pub is_token: bool,
    #[serde(flatten)]
    pub findings: PatternFindings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_security: Option<TokenSecurityRecord>,
    pub security_issues: Vec<String>,
}

/// Final two-factor risk assessment returned by `/risk`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetrics {
    pub contract_risk: f64,
    pub security_risk: f64,
    pub overall_risk: f64,
    pub risk_level: RiskLevel,
    pub details: RiskDetails,
}

// ============================================
// Market-side collector snapshots
// ============================================

/// Best DEX pair liquidity for the address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquiditySnapshot {
    pub liquidity_usd: f64,
    pub volume_24h_usd: f64,
    pub price_usd: Option<f64>,
    pub pair_count: usize,
    pub dex_id: Option<String>,
    pub symbol: Option<String>,
}

/// Market data for the token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub symbol: Option<String>,
    pub market_cap_usd: Option<f64>,
    pub volume_24h_usd: Option<f64>,
    pub price_change_24h_percent: Option<f64>,
    pub price_change_7d_percent: Option<f64>,
}

/// Recent governance activity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceSnapshot {
    pub space: String,
    pub proposal_count: usize,
    pub active_proposals: usize,
    pub average_votes: f64,
}

/// Multi-factor risk profile returned by `/v1/risk/profile`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfile {
    pub contract_risk: f64,
    pub security_risk: f64,
    pub liquidity_risk: f64,
    pub volatility_risk: f64,
    pub market_risk: f64,
    pub governance_risk: f64,
    pub overall_risk: f64,
    pub risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liquidity: Option<LiquiditySnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<MarketSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub governance: Option<GovernanceSnapshot>,
    pub details: RiskDetails,
}
