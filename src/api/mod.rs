//! Ruster Risk HTTP API
//! Address risk scoring endpoints plus health and stats

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use middleware::{start_cleanup_task, RATE_LIMITER};
pub use routes::create_router;
pub use types::*;
