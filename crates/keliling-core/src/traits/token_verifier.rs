//! Access token verification.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::Principal;

/// Resolves a bearer credential to the principal it was issued to.
///
/// Implementations return an `Unauthenticated` error for anything that
/// does not verify (bad signature, expired, wrong audience, malformed).
#[async_trait]
pub trait TokenVerifier: Send + Sync + std::fmt::Debug + 'static {
    /// Verify `token` and return its principal.
    async fn verify(&self, token: &str) -> AppResult<Principal>;
}
