//! API Route Configuration

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{self, AppState};
use super::middleware::{auth_middleware, logging_middleware, rate_limit_middleware};

/// Create the API router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // /api routes
    let api = Router::new()
        // Health & Status
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats))
        // Token Analysis
        .route("/token/analyze", post(handlers::analyze_token))
        .route("/token/:token_address/risk", get(handlers::get_token_risk))
        .route(
            "/token/:token_address/holders",
            get(handlers::get_token_holders),
        )
        .route(
            "/token/:token_address/transactions",
            get(handlers::get_token_transactions),
        )
        // Alerts
        .route("/alerts", get(handlers::get_alerts))
        .route("/alerts/subscribe", post(handlers::subscribe_alerts))
        .route(
            "/alerts/subscriptions/:subscription_id",
            get(handlers::get_subscription_feed),
        )
        .route("/alerts/:alert_id", delete(handlers::delete_alert));

    // Build full router
    Router::new()
        .nest("/api", api)
        // Also expose at root for convenience
        .route("/health", get(handlers::health_check))
        .with_state(state)
        // Middleware (order matters - bottom runs first)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(rate_limit_middleware))
        .layer(middleware::from_fn(auth_middleware))
}
