//! # keliling-api
//!
//! HTTP API layer for Keliling built on Axum.
//!
//! Provides the presence update endpoint (and its legacy alias), the
//! public vendor listing, health checks, the `/ws` change feed, plus the
//! middleware stack (rate limiting, CORS, request logging) and the
//! mapping from `AppError` to JSON error bodies.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, serve};
pub use error::ApiError;
pub use state::AppState;
