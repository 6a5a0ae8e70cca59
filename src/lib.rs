//! Ruster Risk Library
//!
//! Heuristic risk scoring for Ethereum contract addresses:
//! - Regex pattern analysis of verified Solidity source
//! - Token classification and token-security oracle flags
//! - Two-factor risk score (contract + security) served on `/risk`
//! - Multi-factor profile (liquidity, volatility, market, governance)

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{analyze_source, build_profile, compute_risk, is_token_contract};
pub use models::config::AppConfig;
pub use models::errors::{AppError, AppResult, ErrorCode};
pub use models::types::{
    ContractSourceRecord, PatternFindings, RiskLevel, RiskMetrics, RiskProfile,
    TokenSecurityRecord,
};
pub use utils::telemetry::{TelemetryCollector, TelemetryStats};
