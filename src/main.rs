//! Keliling Server: vendor presence API
//!
//! Main entry point that wires all crates together and starts the server.

use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, fmt};

use keliling_core::config::AppConfig;
use keliling_core::error::{AppError, ErrorKind};
use keliling_database::StoreHandle;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and the environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("KELILING_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Keliling v{}", env!("CARGO_PKG_VERSION"));

    let store = StoreHandle::open(&config.database).await?;
    store.seed(&config.seed).await?;
    tracing::info!(backend = ?config.database.store, "Vendor store ready");

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Configuration,
            format!("Failed to bind {bind_addr}"),
            e,
        )
    })?;

    let (_state, router) = keliling_api::build_app(config, &store);
    let result = keliling_api::serve(listener, router, shutdown_signal()).await;

    tracing::info!("Shutting down, closing vendor store");
    store.close().await;
    result
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
