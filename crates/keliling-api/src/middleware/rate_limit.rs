//! Token bucket rate limiter middleware.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use tokio::sync::Mutex;
use tracing::warn;

use keliling_core::config::RateLimitConfig;
use keliling_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Message returned once a client's bucket is empty.
pub const RATE_LIMITED: &str = "Too many requests, please try again later.";

/// Tracked clients above which refilled buckets are dropped.
const PRUNE_ABOVE: usize = 4096;

/// Simple in-memory token bucket rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Client key → bucket state.
    buckets: Arc<Mutex<HashMap<String, TokenBucket>>>,
    /// Maximum tokens per bucket.
    max_tokens: u32,
    /// Token refill rate per second.
    refill_rate: f64,
    /// When false every request passes.
    enabled: bool,
    /// Key on `X-Forwarded-For` instead of the peer address.
    trust_forwarded: bool,
}

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Creates a new rate limiter.
    pub fn new(max_tokens: u32, refill_rate: f64) -> Self {
        Self {
            buckets: Arc::new(Mutex::new(HashMap::new())),
            max_tokens,
            refill_rate,
            enabled: true,
            trust_forwarded: false,
        }
    }

    /// Creates a limiter from configuration.
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            trust_forwarded: config.trust_forwarded,
            ..Self::new(config.max_requests, config.refill_per_second())
        }
    }

    /// Attempts to consume a token for the given key.
    pub async fn check(&self, key: &str) -> bool {
        if !self.enabled {
            return true;
        }

        let mut buckets = self.buckets.lock().await;
        let now = Instant::now();

        if buckets.len() >= PRUNE_ABOVE {
            self.prune_full(&mut buckets, now);
        }

        let bucket = buckets.entry(key.to_string()).or_insert(TokenBucket {
            tokens: self.max_tokens as f64,
            last_refill: now,
        });

        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_rate).min(self.max_tokens as f64);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Drops buckets that have refilled completely.
    pub async fn prune(&self) {
        let mut buckets = self.buckets.lock().await;
        self.prune_full(&mut buckets, Instant::now());
    }

    /// Number of clients currently tracked.
    pub async fn tracked(&self) -> usize {
        self.buckets.lock().await.len()
    }

    /// The bucket key for a request.
    pub fn client_key(&self, headers: &HeaderMap, extensions: &Extensions) -> String {
        client_ip_from(headers, extensions, self.trust_forwarded)
            .unwrap_or_else(|| "unknown".to_string())
    }

    // A full bucket behaves exactly like an absent one.
    fn prune_full(&self, buckets: &mut HashMap<String, TokenBucket>, now: Instant) {
        let max = self.max_tokens as f64;
        buckets.retain(|_, b| {
            let elapsed = now.duration_since(b.last_refill).as_secs_f64();
            b.tokens + elapsed * self.refill_rate < max
        });
    }
}

/// Client address: the peer address, or the first `X-Forwarded-For` hop
/// when `trust_forwarded` is set and the header is present.
pub fn client_ip_from(
    headers: &HeaderMap,
    extensions: &Extensions,
    trust_forwarded: bool,
) -> Option<String> {
    if trust_forwarded {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(ip) = forwarded {
            return Some(ip.to_string());
        }
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}

/// [`client_ip_from`] for extractor parts.
pub fn client_ip(parts: &Parts, trust_forwarded: bool) -> Option<String> {
    client_ip_from(&parts.headers, &parts.extensions, trust_forwarded)
}

/// Rejects the request with 429 once the client's bucket is empty.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = state
        .rate_limiter
        .client_key(request.headers(), request.extensions());

    if !state.rate_limiter.check(&key).await {
        warn!(client = %key, path = %request.uri().path(), "Rate limit exceeded");
        return Err(AppError::rate_limited(RATE_LIMITED).into());
    }

    Ok(next.run(request).await)
}
