//! Health check handlers.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use crate::dto::response::{HealthResponse, OkResponse};
use crate::state::AppState;

/// GET /
pub async fn root() -> Json<OkResponse> {
    Json(OkResponse { ok: true })
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = match state.store.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            warn!(error = %e, "Store health check failed");
            false
        }
    };

    Json(HealthResponse {
        status: if store { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        store,
    })
}
