//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! `config/default.toml`, an optional `config/{env}.toml` overlay, and
//! `KELILING__SECTION__KEY` environment variables, in that order.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod rate_limit;
pub mod realtime;
pub mod seed;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::database::{DatabaseConfig, StoreBackend};
pub use self::logging::LoggingConfig;
pub use self::rate_limit::RateLimitConfig;
pub use self::realtime::RealtimeConfig;
pub use self::seed::{SeedConfig, SeedVendor};

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Vendor store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Access token verification settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Per-client request budget for mutating routes.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Change feed settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Vendors inserted when the store starts empty.
    #[serde(default)]
    pub seed: SeedConfig,
}

impl AppConfig {
    /// Load configuration for `env` from the `config/` directory.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config", env)
    }

    /// Load configuration for `env` from an explicit directory.
    ///
    /// Both files are optional; missing sections fall back to defaults.
    pub fn load_from(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("KELILING")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject configurations the server cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }
        if self.database.store == StoreBackend::Postgres && self.database.url.trim().is_empty() {
            return Err(AppError::configuration(
                "database.url is required when database.store = \"postgres\"",
            ));
        }
        if self.rate_limit.enabled && self.rate_limit.max_requests == 0 {
            return Err(AppError::configuration(
                "rate_limit.max_requests must be greater than zero",
            ));
        }
        Ok(())
    }
}
