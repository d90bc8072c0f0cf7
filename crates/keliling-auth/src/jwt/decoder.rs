//! JWT access token validation.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use keliling_core::config::AuthConfig;
use keliling_core::error::AppError;
use keliling_core::result::AppResult;
use keliling_core::traits::TokenVerifier;
use keliling_core::types::Principal;

use super::claims::Claims;

/// Message returned for every verification failure.
pub const INVALID_TOKEN: &str = "Invalid token";

/// Validates HS256 access tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;
        if config.audience.is_empty() {
            validation.validate_aud = false;
        } else {
            validation.set_audience(&[config.audience.as_str()]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates an access token string.
    ///
    /// Signature, expiry and audience failures all collapse into the same
    /// `Unauthenticated` error; the cause is only logged.
    pub fn decode_access_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Access token rejected");
                AppError::unauthenticated(INVALID_TOKEN)
            })
    }
}

#[async_trait]
impl TokenVerifier for JwtDecoder {
    async fn verify(&self, token: &str) -> AppResult<Principal> {
        self.decode_access_token(token).map(Principal::from)
    }
}
