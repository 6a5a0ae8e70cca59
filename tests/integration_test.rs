//! Integration tests for Ruster Risk

use ruster_risk::core::patterns::{
    MSG_BLACKLIST, MSG_INLINE_ASSEMBLY, MSG_OWNER_MINT_TRANSFER, MSG_REENTRANCY,
    MSG_TX_ORIGIN, MSG_UNCHECKED_CALL,
};
use ruster_risk::core::risk_calculator::{
    ISSUE_BLACKLISTED, ISSUE_NO_ACCESS_CONTROL, ISSUE_REENTRANCY, ISSUE_SELF_DESTRUCT,
    ISSUE_UNVERIFIED,
};
use ruster_risk::{
    analyze_source, build_profile, compute_risk, is_token_contract, ContractSourceRecord,
    PatternFindings, RiskLevel, TokenSecurityRecord,
};

const MOON_TOKEN: &str = include_str!("fixtures/moon_token.sol");
const LEGACY_VAULT: &str = include_str!("fixtures/legacy_vault.sol");

const EPS: f64 = 1e-9;

fn verified(source: &str, compiler: &str, optimized: bool) -> ContractSourceRecord {
    ContractSourceRecord {
        verified: true,
        source_code_text: source.to_string(),
        compiler_version: compiler.to_string(),
        optimization_enabled: optimized,
        protocol_age_years: 1.5,
        contract_name: "Fixture".to_string(),
    }
}

/// Same steps the `/risk` handler runs once the collectors have answered
fn score(record: &ContractSourceRecord, token: Option<&TokenSecurityRecord>) -> ruster_risk::RiskMetrics {
    let findings = analyze_source(&record.source_code_text);
    let is_token = is_token_contract(&record.source_code_text);
    compute_risk(record, &findings, token, is_token)
}

#[test]
fn test_unverified_contract_scenario() {
    let metrics = score(&ContractSourceRecord::unverified(), None);

    assert!((metrics.contract_risk - 0.6).abs() < EPS);
    assert!((metrics.security_risk - 0.15).abs() < EPS);
    assert!((metrics.overall_risk - 0.375).abs() < EPS);
    assert_eq!(
        metrics.details.security_issues,
        vec![ISSUE_UNVERIFIED.to_string(), ISSUE_NO_ACCESS_CONTROL.to_string()]
    );
    assert!(!metrics.details.is_token);
    assert!((metrics.details.code_quality - 0.1).abs() < EPS);
}

#[test]
fn test_explorer_outage_scenario() {
    let findings = PatternFindings::unavailable("Max rate limit reached");
    let metrics = compute_risk(&ContractSourceRecord::unverified(), &findings, None, false);

    assert!((metrics.contract_risk - 0.5).abs() < EPS);
    assert_eq!(
        metrics.details.security_issues.last().map(String::as_str),
        Some("Analysis unavailable: Max rate limit reached")
    );
}

#[test]
fn test_selfdestruct_scenario() {
    let source = r#"
        pragma solidity ^0.8.0;
        contract Bomb {
            bool public paused;
            function boom() external whenNotPaused { selfdestruct(payable(msg.sender)); }
        }
    "#;
    let metrics = score(&verified(source, "v0.8.20+commit.a1b79de6", true), None);

    assert!((metrics.contract_risk - 0.0).abs() < EPS);
    assert!((metrics.security_risk - 0.25).abs() < EPS);
    assert!((metrics.overall_risk - 0.125).abs() < EPS);
    assert_eq!(
        metrics.details.security_issues,
        vec![ISSUE_SELF_DESTRUCT.to_string(), ISSUE_NO_ACCESS_CONTROL.to_string()]
    );
}

#[test]
fn test_token_with_oracle_flags() {
    assert!(is_token_contract(MOON_TOKEN));

    let oracle = TokenSecurityRecord {
        is_blacklisted: true,
        buy_tax_percent: 5.0,
        sell_tax_percent: 25.0,
        ..TokenSecurityRecord::default()
    };
    let metrics = score(&verified(MOON_TOKEN, "v0.8.19+commit.7dd6d404", true), Some(&oracle));

    assert!(metrics.details.is_token);
    assert_eq!(
        metrics.details.findings.major_risks,
        vec![MSG_OWNER_MINT_TRANSFER.to_string(), MSG_BLACKLIST.to_string()]
    );
    // 2 major findings
    assert!((metrics.contract_risk - 0.25).abs() < EPS);
    // not pausable + blacklisted + sell tax
    assert!((metrics.security_risk - 0.40).abs() < EPS);
    assert!((metrics.overall_risk - 0.325).abs() < EPS);
    assert_eq!(metrics.risk_level, RiskLevel::Low);
    assert_eq!(
        metrics.details.security_issues,
        vec![
            MSG_OWNER_MINT_TRANSFER.to_string(),
            MSG_BLACKLIST.to_string(),
            ISSUE_BLACKLISTED.to_string(),
            "High sell tax: 25%".to_string(),
        ]
    );
    assert_eq!(metrics.details.token_security, Some(oracle));
}

#[test]
fn test_token_without_oracle_answer() {
    let metrics = score(&verified(MOON_TOKEN, "v0.8.19+commit.7dd6d404", true), None);
    assert!(metrics.details.is_token);
    assert!(metrics.details.token_security.is_none());
    assert!((metrics.security_risk - 0.05).abs() < EPS);
}

#[test]
fn test_legacy_vault() {
    assert!(!is_token_contract(LEGACY_VAULT));

    let record = verified(LEGACY_VAULT, "v0.6.12+commit.27d51765", false);
    let metrics = score(&record, None);
    let findings = &metrics.details.findings;

    assert!(findings.has_self_destruct);
    assert!(findings.has_reentrancy_risk);
    assert!(findings.has_access_control);
    assert!(!findings.has_pausable);
    assert_eq!(
        findings.critical_vulnerabilities,
        vec![
            MSG_UNCHECKED_CALL.to_string(),
            MSG_TX_ORIGIN.to_string(),
            MSG_REENTRANCY.to_string(),
        ]
    );
    assert_eq!(
        findings.minor_risks,
        vec![
            "Outdated compiler version (0.6.12)".to_string(),
            MSG_INLINE_ASSEMBLY.to_string(),
        ]
    );

    // critical capped at 0.4, minor capped at 0.05
    assert!((metrics.contract_risk - 0.45).abs() < EPS);
    assert!((metrics.security_risk - 0.40).abs() < EPS);
    assert!((metrics.overall_risk - 0.425).abs() < EPS);
    assert_eq!(metrics.risk_level, RiskLevel::Medium);
    assert!((metrics.details.code_quality - 0.4).abs() < EPS);
    assert_eq!(metrics.details.security_issues.len(), 7);
    assert!(metrics
        .details
        .security_issues
        .contains(&ISSUE_REENTRANCY.to_string()));
}

#[test]
fn test_metrics_json_shape() {
    let metrics = score(&verified(MOON_TOKEN, "v0.8.19+commit.7dd6d404", true), None);
    let json = serde_json::to_value(&metrics).unwrap();

    for key in ["contractRisk", "securityRisk", "overallRisk", "riskLevel", "details"] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
    let details = &json["details"];
    for key in [
        "verified",
        "compilerVersion",
        "protocolAgeYears",
        "codeQuality",
        "isToken",
        "hasSelfDestruct",
        "hasReentrancyRisk",
        "criticalVulnerabilities",
        "majorRisks",
        "minorRisks",
        "securityIssues",
    ] {
        assert!(details.get(key).is_some(), "missing details.{}", key);
    }
    assert!(details.get("tokenSecurity").is_none());
    assert_eq!(json["riskLevel"], "SAFE");
}

#[test]
fn test_profile_over_fixture() {
    let metrics = score(&verified(LEGACY_VAULT, "v0.6.12+commit.27d51765", false), None);
    let profile = build_profile(metrics, None, None, None);

    // 0.45*0.25 + 0.8*0.25 + 0.5*0.15 + 0.5*0.20 + 0.5*0.15
    assert!((profile.overall_risk - 0.5625).abs() < EPS);
    assert!((profile.security_risk - 0.40).abs() < EPS);
    assert_eq!(profile.risk_level, RiskLevel::Medium);
}
