//! Source Pattern Analyzer
//!
//! Regex scan of raw Solidity source for dangerous constructs. Produces six
//! boolean flags plus three severity-tagged lists (critical / major / minor).
//!
//! This is text matching, not parsing: matches inside comments count, and the
//! reentrancy check is a whole-file co-occurrence test (a guard anywhere in
//! the file silences every value-carrying call). Good enough for an advisory
//! score, not for an audit.

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::classifier::strip_comments_and_strings;
use crate::models::types::PatternFindings;

// ============================================
// Finding messages
// ============================================

pub const MSG_UNCHECKED_CALL: &str = "Unchecked low-level call return value";
pub const MSG_TX_ORIGIN: &str = "Use of tx.origin for authorization";
pub const MSG_REENTRANCY: &str =
    "Reentrancy risk: external call with value transfer and no reentrancy guard";
pub const MSG_HIDDEN_MINT: &str = "Hidden mint function with restricted visibility";
pub const MSG_OWNER_MINT_TRANSFER: &str = "Owner can mint or transfer tokens";
pub const MSG_UPGRADEABLE_PROXY: &str = "Upgradeable proxy pattern detected";
pub const MSG_BLACKLIST: &str = "Blacklist functionality detected";
pub const MSG_INLINE_ASSEMBLY: &str = "Uses inline assembly";

lazy_static! {
    // ---- flags ----
    static ref SELF_DESTRUCT: Regex =
        Regex::new(r"\b(?:selfdestruct|suicide)\s*\(").expect("selfdestruct regex");
    static ref DELEGATE_CALL: Regex =
        Regex::new(r"\bdelegatecall\s*\(").expect("delegatecall regex");
    static ref UNCHECKED_BLOCK: Regex =
        Regex::new(r"\bunchecked\s*\{").expect("unchecked regex");
    /// `.call{value: x}(...)` or legacy `.call.value(x)(...)`
    static ref VALUE_CALL: Regex =
        Regex::new(r"\.call\s*\{[^}]*\bvalue\s*:|\.call\.value\s*\(").expect("value call regex");
    static ref REENTRANCY_GUARD: Regex = Regex::new(
        r"\b(?:nonReentrant|ReentrancyGuard\w*|noReentrancy|noReentrant|reentrancyGuard|_nonReentrantBefore)\b"
    ).expect("reentrancy guard regex");
    static ref ACCESS_CONTROL: Regex = Regex::new(
        r"\bonly(?:Owner|Admin|Role|Operator|Minter|Governance|Authorized)\b|\bonlyRole\s*\(|msg\.sender\s*==|==\s*msg\.sender|\bhasRole\s*\("
    ).expect("access control regex");
    static ref PAUSABLE: Regex = Regex::new(
        r"\b(?:whenNotPaused|whenPaused|Pausable|_pause|_unpause|pause|unpause|paused)\b"
    ).expect("pausable regex");

    // ---- critical ----
    /// Statement that starts with a low-level call, i.e. the result is dropped.
    /// A statement starts after `;`, `{`, `}`, an `if (...)` / `while (...)`
    /// condition, or `else`. Runs on comment- and string-free code.
    static ref UNCHECKED_LOW_LEVEL_CALL: Regex = Regex::new(
        r"(?:[;{}]|\)\s|\belse\s)\s*(?:(?:payable|address)\s*\()?[A-Za-z_][\w\.\[\]]*\)?\.(?:call|send|delegatecall)\s*(?:\{[^}]*\})?\s*\("
    ).expect("unchecked call regex");
    static ref TX_ORIGIN_AUTH: Regex =
        Regex::new(r"tx\.origin\s*==|==\s*tx\.origin|tx\.origin\s*!=|!=\s*tx\.origin").expect("tx.origin regex");

    // ---- major ----
    static ref HIDDEN_MINT: Regex = Regex::new(
        r"\bfunction\s+mint\w*\s*\([^)]*\)[^{;]*\b(?:internal|private)\b"
    ).expect("hidden mint regex");
    static ref OWNER_MINT_OR_TRANSFER: Regex = Regex::new(
        r"\bonlyOwner\b[^{;]*\{[^}]*\b(?:_mint|mint|_transfer|transfer)\s*\("
    ).expect("owner mint regex");
    static ref PROXY_UPGRADE: Regex = Regex::new(
        r"\b(?:upgradeTo|upgradeToAndCall|_upgradeTo|_upgradeToAndCall|_setImplementation)\s*\("
    ).expect("proxy upgrade regex");
    static ref BLACKLIST_MAPPING: Regex = Regex::new(
        r"\bmapping\s*\(\s*address\s*=>\s*bool\s*\)\s*(?:(?:public|private|internal)\s+)?_?(?i:blacklist|isblacklisted|blacklisted|blocklist|blocked|bots?)\w*"
    ).expect("blacklist regex");

    // ---- minor ----
    static ref OUTDATED_PRAGMA: Regex = Regex::new(
        r"pragma\s+solidity\s*[\^>=<~\s]*0\.([0-7])\.(\d+)"
    ).expect("pragma regex");
    static ref INLINE_ASSEMBLY: Regex =
        Regex::new(r#"\bassembly\s*(?:\(\s*"[^"]*"\s*\)\s*)?\{"#).expect("assembly regex");
}

/// Analyze raw Solidity source. Empty input yields the all-false default.
pub fn analyze_source(source: &str) -> PatternFindings {
    if source.trim().is_empty() {
        return PatternFindings::default();
    }

    let has_value_call = VALUE_CALL.is_match(source);
    let has_guard = REENTRANCY_GUARD.is_match(source);

    let mut findings = PatternFindings {
        has_self_destruct: SELF_DESTRUCT.is_match(source),
        has_delegate_call: DELEGATE_CALL.is_match(source),
        has_unchecked_math: UNCHECKED_BLOCK.is_match(source),
        has_reentrancy_risk: has_value_call && !has_guard,
        has_access_control: ACCESS_CONTROL.is_match(source),
        has_pausable: PAUSABLE.is_match(source),
        ..PatternFindings::default()
    };

    // Critical
    if UNCHECKED_LOW_LEVEL_CALL.is_match(&strip_comments_and_strings(source)) {
        findings.critical_vulnerabilities.push(MSG_UNCHECKED_CALL.to_string());
    }
    if TX_ORIGIN_AUTH.is_match(source) {
        findings.critical_vulnerabilities.push(MSG_TX_ORIGIN.to_string());
    }
    if findings.has_reentrancy_risk {
        findings.critical_vulnerabilities.push(MSG_REENTRANCY.to_string());
    }

    // Major
    if HIDDEN_MINT.is_match(source) {
        findings.major_risks.push(MSG_HIDDEN_MINT.to_string());
    }
    if OWNER_MINT_OR_TRANSFER.is_match(source) {
        findings.major_risks.push(MSG_OWNER_MINT_TRANSFER.to_string());
    }
    if PROXY_UPGRADE.is_match(source) {
        findings.major_risks.push(MSG_UPGRADEABLE_PROXY.to_string());
    }
    if BLACKLIST_MAPPING.is_match(source) {
        findings.major_risks.push(MSG_BLACKLIST.to_string());
    }

    // Minor
    if let Some(caps) = OUTDATED_PRAGMA.captures(source) {
        let minor = caps.get(1).map_or("", |m| m.as_str());
        let patch = caps.get(2).map_or("", |m| m.as_str());
        findings
            .minor_risks
            .push(format!("Outdated compiler version (0.{}.{})", minor, patch));
    }
    if INLINE_ASSEMBLY.is_match(source) {
        findings.minor_risks.push(MSG_INLINE_ASSEMBLY.to_string());
    }

    findings
}
