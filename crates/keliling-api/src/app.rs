//! Server wiring and lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use keliling_auth::JwtDecoder;
use keliling_core::config::AppConfig;
use keliling_core::error::{AppError, ErrorKind};
use keliling_core::result::AppResult;
use keliling_database::StoreHandle;
use keliling_realtime::MemoryChangeFeed;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the application state and router from configuration and an
/// already-opened store.
pub fn build_app(config: AppConfig, store: &StoreHandle) -> (AppState, Router) {
    let verifier = Arc::new(JwtDecoder::new(&config.auth));
    let feed = Arc::new(MemoryChangeFeed::new(config.realtime.channel_buffer_size));
    let state = AppState::new(config, verifier, Arc::clone(&store.store), feed);
    let router = build_router(state.clone());
    (state, router)
}

/// Serves `router` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().map_err(|e| {
        AppError::with_source(ErrorKind::Configuration, "Failed to read bound address", e)
    })?;
    info!(%addr, "Keliling server listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .map_err(|e| AppError::unexpected(format!("Server error: {e}")))
}
