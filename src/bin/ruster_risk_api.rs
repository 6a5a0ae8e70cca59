//! Ruster Risk API Server
//!
//! REST API for heuristic Ethereum address risk scoring
//!
//! Usage:
//!   cargo run --bin ruster_risk_api
//!
//! Environment:
//!   PORT / RISK_PORT   - Server port (default: 3001)
//!   RISK_HOST          - Server host (default: 0.0.0.0)
//!   ETHERSCAN_API_KEY  - Block explorer key (strongly recommended)
//!   COINGECKO_API_KEY  - Market data key (optional)
//!   RUST_LOG           - Log filter (default: info)

use ruster_risk::api::{create_router, start_cleanup_task, AppState, RATE_LIMITER};
use ruster_risk::utils::constants::{APP_NAME, APP_VERSION};
use ruster_risk::{AppConfig, TelemetryCollector};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("🚀 {} v{}", APP_NAME, APP_VERSION);

    let config = AppConfig::from_env();
    let addr = config.bind_addr()?;

    RATE_LIMITER.set_requests_per_window(config.rate_limit_per_minute);
    start_cleanup_task();
    info!(
        "🧹 Rate limiter: {} requests/minute per client",
        config.rate_limit_per_minute
    );

    let telemetry = Arc::new(TelemetryCollector::new());
    let telemetry_for_shutdown = telemetry.clone();

    let state = Arc::new(AppState::new(config, telemetry)?);
    let app = create_router(state);

    info!("🌐 Listening on http://{}", addr);
    info!("Endpoints:");
    info!("  GET /risk?address=0x...              - Two-factor risk score");
    info!("  GET /v1/risk?address=0x...           - Two-factor risk score");
    info!("  GET /v1/risk/profile?address=0x...   - Multi-factor risk profile");
    info!("  GET /v1/stats                        - Analysis statistics");
    info!("  GET /v1/health                       - Health check");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("⚠️ Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("🛑 Shutdown signal received");
    let stats = telemetry_for_shutdown.get_stats();
    info!("   Total analyzed: {}", stats.total_analyzed);
    info!("   High risk: {}", stats.high_risk_detected);
    info!("   Rejected: {}", stats.rejected_requests);
    info!("👋 {} shutdown complete", APP_NAME);

    Ok(())
}
