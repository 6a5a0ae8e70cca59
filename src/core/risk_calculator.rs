//! Risk Aggregation Module
//!
//! Combines explorer metadata, source pattern findings and (for tokens) the
//! token security oracle into 0.0-1.0 risk scores plus a flattened,
//! ordered list of human-readable security issues.
//!
//! Canonical formula: `overall = (contract + security) / 2`.
//! Everything here is a pure function of its inputs and never fails.

use crate::models::types::{
    ContractSourceRecord, PatternFindings, RiskDetails, RiskLevel, RiskMetrics,
    TokenSecurityRecord,
};

// ============================================
// Contract risk weights
// ============================================

/// Base penalty for any unverified contract
pub const UNVERIFIED_BASE_PENALTY: f64 = 0.2;
/// Extra penalty when the explorer could not be queried
pub const API_LIMITED_PENALTY: f64 = 0.3;
/// Ceiling for unverified + API limited
pub const API_LIMITED_CAP: f64 = 0.7;
/// Extra penalty when the contract is simply not verified
pub const UNVERIFIED_PENALTY: f64 = 0.4;

const CRITICAL_WEIGHT: f64 = 0.2;
const CRITICAL_CAP: f64 = 0.4;
const MAJOR_WEIGHT: f64 = 0.125;
const MAJOR_CAP: f64 = 0.25;
const MINOR_WEIGHT: f64 = 0.025;
const MINOR_CAP: f64 = 0.05;

// ============================================
// Security risk weights
// ============================================

pub const SELF_DESTRUCT_WEIGHT: f64 = 0.15;
pub const DELEGATE_CALL_WEIGHT: f64 = 0.12;
pub const UNCHECKED_MATH_WEIGHT: f64 = 0.08;
pub const REENTRANCY_WEIGHT: f64 = 0.20;
pub const NO_ACCESS_CONTROL_WEIGHT: f64 = 0.10;
pub const NOT_PAUSABLE_WEIGHT: f64 = 0.05;

pub const HONEYPOT_WEIGHT: f64 = 0.30;
pub const BLACKLISTED_WEIGHT: f64 = 0.25;
pub const SCAM_WEIGHT: f64 = 0.30;
pub const HIGH_RISK_WEIGHT: f64 = 0.20;
pub const CANNOT_SELL_ALL_WEIGHT: f64 = 0.15;
pub const HIGH_BUY_TAX_WEIGHT: f64 = 0.10;
pub const HIGH_SELL_TAX_WEIGHT: f64 = 0.10;

/// Buy/sell tax (percent) above which a token is penalized
pub const HIGH_TAX_THRESHOLD_PERCENT: f64 = 20.0;

// ============================================
// Code quality
// ============================================

const UNVERIFIED_CODE_QUALITY: f64 = 0.1;
const MIN_CODE_QUALITY: f64 = 0.4;

// ============================================
// Issue sentences
// ============================================

pub const ISSUE_UNVERIFIED: &str = "Contract not verified - source code unavailable for analysis";
pub const ISSUE_SELF_DESTRUCT: &str = "Contract contains selfdestruct function";
pub const ISSUE_DELEGATE_CALL: &str = "Contract uses delegatecall";
pub const ISSUE_REENTRANCY: &str = "Potential reentrancy vulnerability detected";
pub const ISSUE_NO_ACCESS_CONTROL: &str = "No access control mechanisms found";
pub const ISSUE_HONEYPOT: &str = "Token is a honeypot - holders cannot sell";
pub const ISSUE_BLACKLISTED: &str = "Token has blacklist functionality";
pub const ISSUE_SCAM: &str = "Token flagged as a potential scam";
pub const ISSUE_HIGH_RISK: &str = "Token flagged as high risk by security oracle";
pub const ISSUE_CANNOT_SELL_ALL: &str = "Token holders cannot sell all of their tokens";

/// Contract risk from verification status and vulnerability counts
pub fn contract_risk(record: &ContractSourceRecord, findings: &PatternFindings) -> f64 {
    if !record.verified {
        return if findings.indicates_analysis_failure() {
            (UNVERIFIED_BASE_PENALTY + API_LIMITED_PENALTY).min(API_LIMITED_CAP)
        } else {
            (UNVERIFIED_BASE_PENALTY + UNVERIFIED_PENALTY).min(1.0)
        };
    }

    let critical = (findings.critical_vulnerabilities.len() as f64 * CRITICAL_WEIGHT).min(CRITICAL_CAP);
    let major = (findings.major_risks.len() as f64 * MAJOR_WEIGHT).min(MAJOR_CAP);
    let minor = (findings.minor_risks.len() as f64 * MINOR_WEIGHT).min(MINOR_CAP);

    (critical + major + minor).min(1.0)
}

/// Security risk from pattern flags plus token oracle flags (tokens only)
pub fn security_risk(
    findings: &PatternFindings,
    token_security: Option<&TokenSecurityRecord>,
    is_token: bool,
) -> f64 {
    let flag_weights = [
        (findings.has_self_destruct, SELF_DESTRUCT_WEIGHT),
        (findings.has_delegate_call, DELEGATE_CALL_WEIGHT),
        (findings.has_unchecked_math, UNCHECKED_MATH_WEIGHT),
        (findings.has_reentrancy_risk, REENTRANCY_WEIGHT),
        (!findings.has_access_control, NO_ACCESS_CONTROL_WEIGHT),
        (!findings.has_pausable, NOT_PAUSABLE_WEIGHT),
    ];

    let mut risk: f64 = flag_weights
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, weight)| weight)
        .sum();

    if let Some(token) = token_security.filter(|_| is_token) {
        let token_weights = [
            (token.is_honeypot, HONEYPOT_WEIGHT),
            (token.is_blacklisted, BLACKLISTED_WEIGHT),
            (token.is_scam, SCAM_WEIGHT),
            (token.is_high_risk, HIGH_RISK_WEIGHT),
            (token.cannot_sell_all, CANNOT_SELL_ALL_WEIGHT),
            (token.buy_tax_percent > HIGH_TAX_THRESHOLD_PERCENT, HIGH_BUY_TAX_WEIGHT),
            (token.sell_tax_percent > HIGH_TAX_THRESHOLD_PERCENT, HIGH_SELL_TAX_WEIGHT),
        ];
        risk += token_weights
            .iter()
            .filter(|(set, _)| *set)
            .map(|(_, weight)| weight)
            .sum::<f64>();
    }

    risk.min(1.0)
}

/// Fraction of good-practice signals present, floored at 0.4 (0.1 if unverified)
pub fn code_quality(record: &ContractSourceRecord, findings: &PatternFindings) -> f64 {
    if !record.verified {
        return UNVERIFIED_CODE_QUALITY;
    }

    let modern_compiler = matches!(record.compiler_semver(), Some((major, minor)) if major > 0 || minor >= 8);

    let signals = [
        record.optimization_enabled,
        modern_compiler,
        findings.has_access_control,
        findings.has_pausable,
        !findings.has_self_destruct,
        !findings.has_delegate_call,
    ];

    let present = signals.iter().filter(|s| **s).count() as f64;
    (present / signals.len() as f64).max(MIN_CODE_QUALITY)
}

/// Ordered issue list: unverified notice, critical, major, flag-derived,
/// token-derived, minor
pub fn security_issues(
    record: &ContractSourceRecord,
    findings: &PatternFindings,
    token_security: Option<&TokenSecurityRecord>,
    is_token: bool,
) -> Vec<String> {
    let mut issues = Vec::new();

    if !record.verified {
        issues.push(ISSUE_UNVERIFIED.to_string());
    }

    issues.extend(findings.critical_vulnerabilities.iter().cloned());
    issues.extend(findings.major_risks.iter().cloned());

    if findings.has_self_destruct {
        issues.push(ISSUE_SELF_DESTRUCT.to_string());
    }
    if findings.has_delegate_call {
        issues.push(ISSUE_DELEGATE_CALL.to_string());
    }
    if findings.has_reentrancy_risk {
        issues.push(ISSUE_REENTRANCY.to_string());
    }
    if !findings.has_access_control {
        issues.push(ISSUE_NO_ACCESS_CONTROL.to_string());
    }

    if let Some(token) = token_security.filter(|_| is_token) {
        issues.extend(token_issues(token));
    }

    issues.extend(findings.minor_risks.iter().cloned());
    issues
}

/// Sentences for every token oracle flag that is set
pub fn token_issues(token: &TokenSecurityRecord) -> Vec<String> {
    let mut issues = Vec::new();

    if token.is_honeypot {
        issues.push(ISSUE_HONEYPOT.to_string());
    }
    if token.is_blacklisted {
        issues.push(ISSUE_BLACKLISTED.to_string());
    }
    if token.is_scam {
        issues.push(ISSUE_SCAM.to_string());
    }
    if token.is_high_risk {
        issues.push(ISSUE_HIGH_RISK.to_string());
    }
    if token.cannot_sell_all {
        issues.push(ISSUE_CANNOT_SELL_ALL.to_string());
    }
    if token.buy_tax_percent > HIGH_TAX_THRESHOLD_PERCENT {
        issues.push(format!("High buy tax: {}%", token.buy_tax_percent));
    }
    if token.sell_tax_percent > HIGH_TAX_THRESHOLD_PERCENT {
        issues.push(format!("High sell tax: {}%", token.sell_tax_percent));
    }

    issues
}

/// Builder for assembling [`RiskMetrics`] from collector output
pub struct RiskMetricsBuilder {
    record: ContractSourceRecord,
    findings: PatternFindings,
    token_security: Option<TokenSecurityRecord>,
    is_token: bool,
}

impl RiskMetricsBuilder {
    pub fn new(record: ContractSourceRecord, findings: PatternFindings) -> Self {
        Self {
            record,
            findings,
            token_security: None,
            is_token: false,
        }
    }

    /// Mark the contract as a token, with whatever the oracle returned
    pub fn with_token(mut self, token_security: Option<TokenSecurityRecord>) -> Self {
        self.is_token = true;
        self.token_security = token_security;
        self
    }

    /// Build final metrics
    pub fn build(self) -> RiskMetrics {
        let token = self.token_security.as_ref();

        let contract_risk = contract_risk(&self.record, &self.findings);
        let security_risk = security_risk(&self.findings, token, self.is_token);
        let overall_risk = (contract_risk + security_risk) / 2.0;
        let code_quality = code_quality(&self.record, &self.findings);
        let security_issues = security_issues(&self.record, &self.findings, token, self.is_token);

        RiskMetrics {
            contract_risk,
            security_risk,
            overall_risk,
            risk_level: RiskLevel::from_score(overall_risk),
            details: RiskDetails {
                verified: self.record.verified,
                contract_name: self.record.contract_name,
                compiler_version: self.record.compiler_version,
                optimization_enabled: self.record.optimization_enabled,
                protocol_age_years: self.record.protocol_age_years,
                code_quality,
                is_token: self.is_token,
                findings: self.findings,
                token_security: if self.is_token { self.token_security } else { None },
                security_issues,
            },
        }
    }
}

/// Compute two-factor risk metrics
pub fn compute_risk(
    record: &ContractSourceRecord,
    findings: &PatternFindings,
    token_security: Option<&TokenSecurityRecord>,
    is_token: bool,
) -> RiskMetrics {
    let builder = RiskMetricsBuilder::new(record.clone(), findings.clone());
    if is_token {
        builder.with_token(token_security.cloned()).build()
    } else {
        builder.build()
    }
}
