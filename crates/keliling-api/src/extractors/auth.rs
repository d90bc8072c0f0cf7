//! `AuthUser` extractor. Pulls the bearer token from the Authorization
//! header, verifies it and injects the request context.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use keliling_core::error::AppError;
use keliling_service::context::RequestContext;

use crate::error::ApiError;
use crate::middleware::rate_limit::client_ip;
use crate::state::AppState;

/// Message for an absent or unparseable Authorization header.
pub const MISSING_TOKEN: &str = "Missing authorization token";

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Extracts the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively and the header must consist
/// of exactly two space-separated parts.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None)
            if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() =>
        {
            Some(token)
        }
        _ => None,
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::unauthenticated(MISSING_TOKEN))?;

        let principal = state.token_verifier.verify(token).await?;
        let ctx = RequestContext::new(
            principal,
            client_ip(parts, state.config.rate_limit.trust_forwarded),
        );

        Ok(AuthUser(ctx))
    }
}
