//! Constants Module
//!
//! Default endpoints, timeouts and limits. Everything here can be overridden
//! through `AppConfig::from_env`.

// ============================================
// APPLICATION CONSTANTS
// ============================================

pub const APP_NAME: &str = "RusterRisk";

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent sent to every upstream
pub const USER_AGENT: &str = concat!("RusterRisk/", env!("CARGO_PKG_VERSION"));

// ============================================
// SERVER
// ============================================

pub const DEFAULT_HOST: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 3001;

/// Requests per client per minute
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 60;

// ============================================
// CHAIN
// ============================================

/// Ethereum Mainnet, the only supported chain
pub const CHAIN_ID_ETHEREUM: u64 = 1;

/// DexScreener chain slug for mainnet
pub const DEXSCREENER_CHAIN_ETHEREUM: &str = "ethereum";

// ============================================
// UPSTREAMS
// ============================================

/// Etherscan v2 multichain endpoint
pub const DEFAULT_ETHERSCAN_BASE_URL: &str = "https://api.etherscan.io/v2/api";

/// GoPlus token security
pub const DEFAULT_TOKEN_SECURITY_BASE_URL: &str = "https://api.gopluslabs.io/api/v1";

pub const DEFAULT_DEXSCREENER_BASE_URL: &str = "https://api.dexscreener.com/latest/dex";

/// CoinGecko public API
pub const DEFAULT_MARKET_DATA_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Snapshot hub GraphQL
pub const DEFAULT_GOVERNANCE_GRAPHQL_URL: &str = "https://hub.snapshot.org/graphql";

/// Per-request upstream timeout (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Wait before the single retry after a market data 429 (milliseconds)
pub const DEFAULT_MARKET_RETRY_DELAY_MS: u64 = 1_000;

/// Upper bound of random jitter added to the retry delay (milliseconds)
pub const MARKET_RETRY_JITTER_MS: u64 = 250;

/// Number of recent proposals inspected per governance space
pub const GOVERNANCE_PROPOSAL_WINDOW: usize = 20;

// ============================================
// SCORING
// ============================================

/// `overallRisk` at or above this counts as high risk in the stats
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

pub const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0;

/// Ethereum address check: `0x` followed by 40 hex digits
pub fn looks_like_ethereum_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ethereum_address_shape() {
        assert!(looks_like_ethereum_address(
            "0xdAC17F958D2ee523a2206206994597C13D831ec7"
        ));
        assert!(looks_like_ethereum_address(
            "0x0000000000000000000000000000000000000000"
        ));
        assert!(!looks_like_ethereum_address("0x1234"));
        assert!(!looks_like_ethereum_address(
            "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"
        ));
        assert!(!looks_like_ethereum_address(
            "0xZZC17F958D2ee523a2206206994597C13D831ec7"
        ));
    }

    #[test]
    fn test_user_agent_carries_version() {
        assert!(USER_AGENT.starts_with("RusterRisk/"));
        assert!(USER_AGENT.ends_with(APP_VERSION));
    }
}
