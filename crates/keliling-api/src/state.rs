//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use keliling_core::config::AppConfig;
use keliling_core::traits::{ChangeFeed, TokenVerifier};
use keliling_database::VendorStore;
use keliling_service::{PresenceService, VendorService};

use crate::middleware::rate_limit::RateLimiter;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Bearer token verifier
    pub token_verifier: Arc<dyn TokenVerifier>,
    /// Vendor store (PostgreSQL or in-memory)
    pub store: Arc<dyn VendorStore>,
    /// Row change feed
    pub feed: Arc<dyn ChangeFeed>,
    /// Presence update service
    pub presence_service: Arc<PresenceService>,
    /// Public vendor listing
    pub vendor_service: Arc<VendorService>,
    /// Per-client rate limiter for the presence routes
    pub rate_limiter: RateLimiter,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Wires services from their collaborators.
    pub fn new(
        config: AppConfig,
        token_verifier: Arc<dyn TokenVerifier>,
        store: Arc<dyn VendorStore>,
        feed: Arc<dyn ChangeFeed>,
    ) -> Self {
        let presence_service = Arc::new(PresenceService::new(
            Arc::clone(&store),
            Arc::clone(&feed),
        ));
        let vendor_service = Arc::new(VendorService::new(Arc::clone(&store)));
        let rate_limiter = RateLimiter::from_config(&config.rate_limit);

        Self {
            config: Arc::new(config),
            token_verifier,
            store,
            feed,
            presence_service,
            vendor_service,
            rate_limiter,
            started_at: Instant::now(),
        }
    }
}
