//! Multi-Factor Risk Profile
//!
//! Alternative to the two-factor `/risk` score. Adds market-side dimensions
//! (liquidity, volatility, market size, governance) and blends them with the
//! contract risk using fixed weights:
//!
//! | factor     | weight |
//! |------------|--------|
//! | contract   | 0.25   |
//! | liquidity  | 0.25   |
//! | volatility | 0.15   |
//! | market     | 0.20   |
//! | governance | 0.15   |
//!
//! Missing collector data maps to a fixed default per dimension.

use crate::models::types::{
    GovernanceSnapshot, LiquiditySnapshot, MarketSnapshot, RiskLevel, RiskMetrics, RiskProfile,
};

pub const CONTRACT_FACTOR_WEIGHT: f64 = 0.25;
pub const LIQUIDITY_FACTOR_WEIGHT: f64 = 0.25;
pub const VOLATILITY_FACTOR_WEIGHT: f64 = 0.15;
pub const MARKET_FACTOR_WEIGHT: f64 = 0.20;
pub const GOVERNANCE_FACTOR_WEIGHT: f64 = 0.15;

/// Used when no DEX pair could be found
pub const DEFAULT_LIQUIDITY_RISK: f64 = 0.8;
pub const DEFAULT_VOLATILITY_RISK: f64 = 0.5;
pub const DEFAULT_MARKET_RISK: f64 = 0.5;
pub const DEFAULT_GOVERNANCE_RISK: f64 = 0.5;

/// Governance risk for a space that exists but never voted on anything
const NO_PROPOSALS_GOVERNANCE_RISK: f64 = 0.7;

/// Deeper pools are harder to drain or manipulate
pub fn liquidity_risk(snapshot: Option<&LiquiditySnapshot>) -> f64 {
    let Some(snapshot) = snapshot else {
        return DEFAULT_LIQUIDITY_RISK;
    };

    let liquidity = snapshot.liquidity_usd;
    let base: f64 = if liquidity >= 10_000_000.0 {
        0.1
    } else if liquidity >= 1_000_000.0 {
        0.3
    } else if liquidity >= 100_000.0 {
        0.5
    } else if liquidity >= 10_000.0 {
        0.7
    } else {
        0.9
    };

    // Pool nobody trades against
    let stale = liquidity > 0.0 && snapshot.volume_24h_usd / liquidity < 0.01;
    let penalty = if stale { 0.1 } else { 0.0 };

    (base + penalty).clamp(0.0, 1.0)
}

/// Blend of 24h and 7d absolute price moves
pub fn volatility_risk(snapshot: Option<&MarketSnapshot>) -> f64 {
    let Some(snapshot) = snapshot else {
        return DEFAULT_VOLATILITY_RISK;
    };

    match (snapshot.price_change_24h_percent, snapshot.price_change_7d_percent) {
        (None, None) => DEFAULT_VOLATILITY_RISK,
        (day, week) => {
            let day = (day.unwrap_or(0.0).abs() / 20.0).min(1.0);
            let week = (week.unwrap_or(0.0).abs() / 50.0).min(1.0);
            (day * 0.6 + week * 0.4).clamp(0.0, 1.0)
        }
    }
}

/// Smaller market caps carry more risk
pub fn market_risk(snapshot: Option<&MarketSnapshot>) -> f64 {
    let Some(market_cap) = snapshot.and_then(|s| s.market_cap_usd) else {
        return DEFAULT_MARKET_RISK;
    };

    if market_cap >= 10_000_000_000.0 {
        0.1
    } else if market_cap >= 1_000_000_000.0 {
        0.2
    } else if market_cap >= 100_000_000.0 {
        0.4
    } else if market_cap >= 10_000_000.0 {
        0.6
    } else {
        0.8
    }
}

/// Active, well-attended governance lowers risk
pub fn governance_risk(snapshot: Option<&GovernanceSnapshot>) -> f64 {
    let Some(snapshot) = snapshot else {
        return DEFAULT_GOVERNANCE_RISK;
    };

    if snapshot.proposal_count == 0 {
        return NO_PROPOSALS_GOVERNANCE_RISK;
    }

    let mut risk: f64 = 0.3;
    if snapshot.average_votes < 10.0 {
        risk += 0.2;
    } else if snapshot.average_votes < 100.0 {
        risk += 0.1;
    }
    if snapshot.active_proposals == 0 {
        risk += 0.1;
    }

    risk.clamp(0.0, 1.0)
}

/// Build the multi-factor profile on top of already computed metrics
pub fn build_profile(
    metrics: RiskMetrics,
    liquidity: Option<LiquiditySnapshot>,
    market: Option<MarketSnapshot>,
    governance: Option<GovernanceSnapshot>,
) -> RiskProfile {
    let liquidity_risk = liquidity_risk(liquidity.as_ref());
    let volatility_risk = volatility_risk(market.as_ref());
    let market_risk = market_risk(market.as_ref());
    let governance_risk = governance_risk(governance.as_ref());

    let overall_risk = (metrics.contract_risk * CONTRACT_FACTOR_WEIGHT
        + liquidity_risk * LIQUIDITY_FACTOR_WEIGHT
        + volatility_risk * VOLATILITY_FACTOR_WEIGHT
        + market_risk * MARKET_FACTOR_WEIGHT
        + governance_risk * GOVERNANCE_FACTOR_WEIGHT)
        .clamp(0.0, 1.0);

    RiskProfile {
        contract_risk: metrics.contract_risk,
        security_risk: metrics.security_risk,
        liquidity_risk,
        volatility_risk,
        market_risk,
        governance_risk,
        overall_risk,
        risk_level: RiskLevel::from_score(overall_risk),
        liquidity,
        market,
        governance,
        details: metrics.details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::patterns::analyze_source;
    use crate::core::risk_calculator::compute_risk;
    use crate::models::types::ContractSourceRecord;

    const EPS: f64 = 1e-9;

    fn unverified_metrics() -> RiskMetrics {
        let record = ContractSourceRecord::unverified();
        compute_risk(&record, &analyze_source(""), None, false)
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total = CONTRACT_FACTOR_WEIGHT
            + LIQUIDITY_FACTOR_WEIGHT
            + VOLATILITY_FACTOR_WEIGHT
            + MARKET_FACTOR_WEIGHT
            + GOVERNANCE_FACTOR_WEIGHT;
        assert!((total - 1.0).abs() < EPS);
    }

    #[test]
    fn test_defaults_when_collectors_fail() {
        let profile = build_profile(unverified_metrics(), None, None, None);
        assert_eq!(profile.liquidity_risk, DEFAULT_LIQUIDITY_RISK);
        assert_eq!(profile.volatility_risk, DEFAULT_VOLATILITY_RISK);
        assert_eq!(profile.market_risk, DEFAULT_MARKET_RISK);
        assert_eq!(profile.governance_risk, DEFAULT_GOVERNANCE_RISK);

        // 0.6*0.25 + 0.8*0.25 + 0.5*0.15 + 0.5*0.2 + 0.5*0.15
        assert!((profile.overall_risk - 0.6).abs() < EPS);
        assert!((profile.security_risk - 0.15).abs() < EPS);
    }

    #[test]
    fn test_liquidity_tiers() {
        let deep = LiquiditySnapshot {
            liquidity_usd: 50_000_000.0,
            volume_24h_usd: 5_000_000.0,
            ..LiquiditySnapshot::default()
        };
        assert!((liquidity_risk(Some(&deep)) - 0.1).abs() < EPS);

        let stale = LiquiditySnapshot {
            liquidity_usd: 200_000.0,
            volume_24h_usd: 100.0,
            ..LiquiditySnapshot::default()
        };
        assert!((liquidity_risk(Some(&stale)) - 0.6).abs() < EPS);

        let empty = LiquiditySnapshot::default();
        assert!((liquidity_risk(Some(&empty)) - 0.9).abs() < EPS);
    }

    #[test]
    fn test_volatility_blend() {
        let calm = MarketSnapshot {
            price_change_24h_percent: Some(-2.0),
            price_change_7d_percent: Some(5.0),
            ..MarketSnapshot::default()
        };
        // 0.1*0.6 + 0.1*0.4
        assert!((volatility_risk(Some(&calm)) - 0.1).abs() < EPS);

        let wild = MarketSnapshot {
            price_change_24h_percent: Some(80.0),
            price_change_7d_percent: Some(-300.0),
            ..MarketSnapshot::default()
        };
        assert!((volatility_risk(Some(&wild)) - 1.0).abs() < EPS);

        assert_eq!(volatility_risk(Some(&MarketSnapshot::default())), DEFAULT_VOLATILITY_RISK);
    }

    #[test]
    fn test_market_cap_tiers() {
        let large = MarketSnapshot {
            market_cap_usd: Some(20_000_000_000.0),
            ..MarketSnapshot::default()
        };
        assert_eq!(market_risk(Some(&large)), 0.1);

        let micro = MarketSnapshot {
            market_cap_usd: Some(500_000.0),
            ..MarketSnapshot::default()
        };
        assert_eq!(market_risk(Some(&micro)), 0.8);
    }

    #[test]
    fn test_governance_scoring() {
        let silent = GovernanceSnapshot {
            space: "dead.eth".to_string(),
            ..GovernanceSnapshot::default()
        };
        assert_eq!(governance_risk(Some(&silent)), NO_PROPOSALS_GOVERNANCE_RISK);

        let healthy = GovernanceSnapshot {
            space: "aave.eth".to_string(),
            proposal_count: 20,
            active_proposals: 2,
            average_votes: 450.0,
        };
        assert!((governance_risk(Some(&healthy)) - 0.3).abs() < EPS);

        let sleepy = GovernanceSnapshot {
            space: "tiny.eth".to_string(),
            proposal_count: 3,
            active_proposals: 0,
            average_votes: 4.0,
        };
        assert!((governance_risk(Some(&sleepy)) - 0.6).abs() < EPS);
    }
}
