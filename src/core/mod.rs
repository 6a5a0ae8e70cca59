//! Core Module - Risk Analysis Logic
//!
//! Pure functions only: source classification, pattern scanning, the
//! two-factor risk aggregator and the multi-factor profile. No I/O here.

pub mod classifier;
pub mod patterns;
pub mod profile;
pub mod risk_calculator;

pub use classifier::{is_token_contract, strip_comments_and_strings};
pub use patterns::analyze_source;
pub use profile::build_profile;
pub use risk_calculator::{compute_risk, RiskMetricsBuilder};
