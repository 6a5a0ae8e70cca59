//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so fallbacks and rejected
//! requests can be traced in logs.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - API_xxx: request-level errors
//! - ADDR_xxx: target address errors
//! - EXPLORER_xxx / TOKEN_SECURITY_xxx / MARKET_xxx / ...: collector errors
//! - CFG_xxx: configuration errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

/// Message returned for a missing or empty `address` query parameter
pub const MISSING_ADDRESS_MESSAGE: &str = "Address parameter is required";

/// Message returned for any unexpected failure inside the analysis pipeline
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to perform risk analysis";

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Extra explanation surfaced to API clients (unsupported targets only)
    pub details: Option<String>,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach client-facing details
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // API Errors
    // ============================================
    /// `address` query parameter missing or empty
    ApiMissingAddress,
    /// Rate limit exceeded
    ApiRateLimited,
    /// Internal server error
    ApiInternalError,

    // ============================================
    // Target Address Errors
    // ============================================
    /// Address is not an Ethereum (0x + 40 hex) address
    AddressNotEthereum,
    /// Address has no bytecode (externally owned account)
    AddressNotContract,

    // ============================================
    // Collector Errors
    // ============================================
    /// Block explorer returned an error payload
    ExplorerError,
    /// Block explorer rate limit or invalid API key
    ExplorerRateLimited,
    /// Token security oracle error
    TokenSecurityError,
    /// DexScreener API error
    DexScreenerError,
    /// Market data API error
    MarketDataError,
    /// Market data API rate limited (HTTP 429)
    MarketDataRateLimited,
    /// Governance API error
    GovernanceError,
    /// Upstream returned a body we could not decode
    UpstreamInvalidResponse,
    /// Upstream connection failed
    UpstreamConnectionFailed,
    /// External service timeout
    ExternalTimeout,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Generic Errors
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiMissingAddress => "API_MISSING_ADDRESS",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "API_INTERNAL_ERROR",

            Self::AddressNotEthereum => "ADDR_NOT_ETHEREUM",
            Self::AddressNotContract => "ADDR_NOT_CONTRACT",

            Self::ExplorerError => "EXPLORER_ERROR",
            Self::ExplorerRateLimited => "EXPLORER_RATE_LIMITED",
            Self::TokenSecurityError => "TOKEN_SECURITY_ERROR",
            Self::DexScreenerError => "DEXSCREENER_ERROR",
            Self::MarketDataError => "MARKET_DATA_ERROR",
            Self::MarketDataRateLimited => "MARKET_DATA_RATE_LIMITED",
            Self::GovernanceError => "GOVERNANCE_ERROR",
            Self::UpstreamInvalidResponse => "UPSTREAM_INVALID_RESPONSE",
            Self::UpstreamConnectionFailed => "UPSTREAM_CONNECTION_FAILED",
            Self::ExternalTimeout => "EXTERNAL_TIMEOUT",

            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ApiMissingAddress | Self::AddressNotEthereum | Self::AddressNotContract => 400,
            Self::ApiRateLimited => 429,
            _ => 500,
        }
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Missing `address` query parameter
    pub fn missing_address() -> Self {
        Self::new(ErrorCode::ApiMissingAddress, MISSING_ADDRESS_MESSAGE)
    }

    /// Address is not in Ethereum form
    pub fn not_ethereum(address: &str) -> Self {
        let guess = if address.len() >= 32 && address.len() <= 44 && !address.starts_with("0x") {
            " (it looks like a Solana or other non-EVM address)"
        } else {
            ""
        };
        Self::new(
            ErrorCode::AddressNotEthereum,
            "Only Ethereum addresses are supported",
        )
        .with_details(format!(
            "Expected a 0x-prefixed, 40 hex character address, got '{}'{}",
            address, guess
        ))
    }

    /// Address holds no bytecode
    pub fn not_contract(address: &str) -> Self {
        Self::new(
            ErrorCode::AddressNotContract,
            "This address is a wallet (externally owned account), not a smart contract",
        )
        .with_details(format!(
            "No bytecode found at {}; risk analysis requires a deployed contract",
            address
        ))
    }

    /// API internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }

    /// Block explorer error payload
    pub fn explorer_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExplorerError, msg)
    }

    /// Block explorer throttled us or rejected the key
    pub fn explorer_rate_limited(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExplorerRateLimited, msg)
    }

    /// Token security oracle error
    pub fn token_security_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::TokenSecurityError, msg)
    }

    /// DexScreener error
    pub fn dexscreener_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::DexScreenerError, msg)
    }

    /// Market data error
    pub fn market_data_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::MarketDataError, msg)
    }

    /// Market data rate limited
    pub fn market_data_rate_limited() -> Self {
        Self::new(ErrorCode::MarketDataRateLimited, "Rate limited (HTTP 429)")
    }

    /// Governance error
    pub fn governance_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::GovernanceError, msg)
    }

    /// Invalid configuration value
    pub fn invalid_config(key: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("Invalid value for {}: '{}'", key, value),
        )
    }
}

// ============================================
// HTTP rendering
// ============================================

/// `{ "error": "..." }` body used for validation and internal failures
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// `{ "error", "message", "details" }` body used for unsupported targets
#[derive(Debug, Serialize)]
pub struct ExplainedErrorBody {
    pub error: String,
    pub message: String,
    pub details: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match self.code {
            ErrorCode::ApiMissingAddress => (
                status,
                Json(ErrorBody {
                    error: MISSING_ADDRESS_MESSAGE.to_string(),
                }),
            )
                .into_response(),
            ErrorCode::AddressNotEthereum | ErrorCode::AddressNotContract => {
                let error = match self.code {
                    ErrorCode::AddressNotEthereum => "Unsupported address",
                    _ => "Not a contract",
                };
                (
                    status,
                    Json(ExplainedErrorBody {
                        error: error.to_string(),
                        message: self.message,
                        details: self.details.unwrap_or_default(),
                    }),
                )
                    .into_response()
            }
            ErrorCode::ApiRateLimited => (
                status,
                Json(ErrorBody {
                    error: self.message,
                }),
            )
                .into_response(),
            // Internal details stay in the logs
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: ANALYSIS_FAILED_MESSAGE.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::ExternalTimeout, "Request timeout")
        } else if err.is_connect() {
            Self::new(ErrorCode::UpstreamConnectionFailed, "Connection failed")
        } else if err.is_decode() {
            Self::new(ErrorCode::UpstreamInvalidResponse, err.to_string())
        } else {
            Self::new(ErrorCode::Unknown, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::UpstreamInvalidResponse, "JSON parse error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::explorer_rate_limited("Max rate limit reached");
        assert_eq!(err.code, ErrorCode::ExplorerRateLimited);
        assert_eq!(err.code_str(), "EXPLORER_RATE_LIMITED");
        assert_eq!(err.to_string(), "[EXPLORER_RATE_LIMITED] Max rate limit reached");
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::ApiMissingAddress.http_status(), 400);
        assert_eq!(ErrorCode::AddressNotEthereum.http_status(), 400);
        assert_eq!(ErrorCode::AddressNotContract.http_status(), 400);
        assert_eq!(ErrorCode::ApiRateLimited.http_status(), 429);
        assert_eq!(ErrorCode::ExplorerError.http_status(), 500);
    }

    #[test]
    fn test_not_ethereum_details_mentions_input() {
        let err = AppError::not_ethereum("So11111111111111111111111111111111111111112");
        let details = err.details.unwrap_or_default();
        assert!(details.contains("So1111"));
        assert!(details.contains("non-EVM"));
    }

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_address_response() {
        let (status, body) = body_of(AppError::missing_address()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"error": MISSING_ADDRESS_MESSAGE}));
    }

    #[tokio::test]
    async fn test_not_contract_response() {
        let address = "0x0000000000000000000000000000000000000abc";
        let (status, body) = body_of(AppError::not_contract(address)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Not a contract");
        assert!(body["message"].as_str().is_some_and(|m| m.contains("wallet")));
        assert!(body["details"].as_str().is_some_and(|d| d.contains(address)));
    }

    #[tokio::test]
    async fn test_internal_response_hides_cause() {
        let (status, body) = body_of(AppError::internal("db exploded at line 42")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"error": ANALYSIS_FAILED_MESSAGE}));

        let (status, _) = body_of(AppError::explorer_error("NOTOK")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
