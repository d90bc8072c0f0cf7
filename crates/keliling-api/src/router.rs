//! Route definitions for the Keliling HTTP API.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let server = &state.config.server;
    let body_limit = server.max_body_bytes;
    let timeout = Duration::from_secs(server.request_timeout_seconds.max(1));
    let cors = build_cors_layer(&server.cors);

    Router::new()
        .route("/", get(handlers::health::root))
        .route("/ws", get(handlers::ws::ws_handler))
        .merge(presence_routes(state.clone()))
        .nest("/api", api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Read-only API endpoints.
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/vendors", get(handlers::vendor::list_vendors))
}

/// Presence update under both the `/api` path and the legacy alias,
/// behind the per-client rate limiter.
fn presence_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/vendor/{id}/online", post(handlers::vendor::set_online))
        .route("/vendor/{id}/online", post(handlers::vendor::set_online))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::rate_limit::rate_limit,
        ))
}
