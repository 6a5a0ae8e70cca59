//! API Route Configuration

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{self, AppState};
use super::middleware::{handle_panic, logging_middleware, rate_limit_middleware};

/// Create the API router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats))
        .route("/risk", get(handlers::get_risk))
        .route("/risk/profile", get(handlers::get_risk_profile));

    Router::new()
        .nest("/v1", api_v1)
        // Unversioned aliases
        .route("/health", get(handlers::health_check))
        .route("/risk", get(handlers::get_risk))
        .with_state(state.clone())
        // Middleware (order matters - bottom runs first)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn_with_state(state, rate_limit_middleware))
        .layer(CatchPanicLayer::custom(handle_panic))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::middleware::RATE_LIMITER;
    use crate::models::config::AppConfig;
    use crate::utils::telemetry::TelemetryCollector;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    fn router() -> (Router, Arc<AppState>) {
        let state = Arc::new(
            AppState::new(AppConfig::default(), Arc::new(TelemetryCollector::new())).unwrap(),
        );
        (create_router(state.clone()), state)
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_address() {
        let (router, _) = router();
        let (status, body) = get_json(router, "/risk").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"error": "Address parameter is required"}));
    }

    #[tokio::test]
    async fn test_empty_address_on_v1() {
        let (router, state) = router();
        let (status, body) = get_json(router, "/v1/risk?address=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Address parameter is required");
        assert_eq!(state.telemetry.get_stats().rejected_requests, 1);
    }

    #[tokio::test]
    async fn test_non_ethereum_address() {
        let (router, _) = router();
        let (status, body) = get_json(
            router,
            "/v1/risk?address=EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unsupported address");
        assert!(body["message"].as_str().is_some());
        assert!(body["details"]
            .as_str()
            .is_some_and(|d| d.contains("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v")));
    }

    #[tokio::test]
    async fn test_profile_rejects_bad_address() {
        let (router, _) = router();
        let (status, body) = get_json(router, "/v1/risk/profile?address=0x1234").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unsupported address");
    }

    #[tokio::test]
    async fn test_duplicate_address_param_is_json_400() {
        let (router, state) = router();
        let (status, body) = get_json(
            router,
            "/v1/risk?address=0x0000000000000000000000000000000000000001&address=0x2",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"error": "Address parameter is required"}));
        assert_eq!(state.telemetry.get_stats().rejected_requests, 1);
    }

    #[tokio::test]
    async fn test_rate_limited_requests_are_counted() {
        let (router, state) = router();
        let limit = RATE_LIMITER.check("203.0.113.250").limit;

        let mut last = None;
        for _ in 0..limit {
            let response = router
                .clone()
                .oneshot(
                    Request::builder()
                        .uri("/v1/stats")
                        .header("x-forwarded-for", "203.0.113.250")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            last = Some(response);
        }

        let response = last.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"]
            .as_str()
            .is_some_and(|e| e.starts_with("Rate limit exceeded")));

        let stats = state.telemetry.get_stats();
        assert_eq!(stats.rate_limited_requests, 1);
        assert_eq!(stats.rejected_requests, 1);
    }

    async fn explode() -> &'static str {
        panic!("analysis exploded")
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_json_500() {
        let router = Router::new()
            .route("/explode", get(explode))
            .layer(CatchPanicLayer::custom(handle_panic));
        let (status, body) = get_json(router, "/explode").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"error": "Failed to perform risk analysis"}));
    }

    #[tokio::test]
    async fn test_health_and_stats() {
        let (router, _) = router();
        let (status, body) = get_json(router.clone(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "healthy");

        let (status, body) = get_json(router, "/v1/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_analyzed"], 0);
    }

    #[tokio::test]
    async fn test_rate_limit_headers_and_request_id() {
        let (router, _) = router();
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/v1/stats")
                    .header("x-forwarded-for", "198.51.100.23")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-ratelimit-remaining"));
        assert!(response.headers().contains_key("x-ratelimit-limit"));
        assert!(response.headers().contains_key("x-request-id"));
    }
}
