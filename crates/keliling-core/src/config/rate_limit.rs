//! Rate limiting configuration.

use serde::{Deserialize, Serialize};

/// Per-client token bucket settings for the presence routes.
///
/// The bucket holds `max_requests` tokens and refills fully over
/// `window_seconds`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether the limiter is active.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Bucket capacity.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Full refill period in seconds.
    #[serde(default = "default_window")]
    pub window_seconds: u64,
    /// Key clients by the first `X-Forwarded-For` hop instead of the peer
    /// address. Enable only behind a proxy that overwrites the header.
    #[serde(default)]
    pub trust_forwarded: bool,
}

impl RateLimitConfig {
    /// Tokens added per second.
    pub fn refill_per_second(&self) -> f64 {
        if self.window_seconds == 0 {
            return f64::from(self.max_requests);
        }
        f64::from(self.max_requests) / self.window_seconds as f64
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_requests: default_max_requests(),
            window_seconds: default_window(),
            trust_forwarded: false,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_max_requests() -> u32 {
    100
}

fn default_window() -> u64 {
    15 * 60
}
