//! JWT token creation for development and tests.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use keliling_core::config::AuthConfig;
use keliling_core::error::AppError;
use keliling_core::result::AppResult;
use keliling_core::types::UserId;

use super::claims::Claims;

/// Creates signed access tokens shaped like the hosted auth service's.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    audience: Option<String>,
    access_ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("audience", &self.audience)
            .field("access_ttl", &self.access_ttl)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            audience: (!config.audience.is_empty()).then(|| config.audience.clone()),
            access_ttl: Duration::minutes(config.access_ttl_minutes as i64),
        }
    }

    /// Issue an access token for `user_id` with the configured TTL.
    pub fn issue(
        &self,
        user_id: UserId,
        role: Option<&str>,
        email: Option<&str>,
    ) -> AppResult<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let exp = now + self.access_ttl;
        let claims = Claims {
            sub: user_id.into_uuid(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            aud: self.audience.clone(),
            role: role.map(str::to_string),
            email: email.map(str::to_string),
        };
        Ok((self.sign(&claims)?, exp))
    }

    /// Issue a token with an explicit TTL. Negative TTLs produce expired tokens.
    pub fn issue_with_ttl(&self, user_id: UserId, ttl: Duration) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.into_uuid(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            aud: self.audience.clone(),
            role: Some("authenticated".to_string()),
            email: None,
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AppError::unexpected(format!("Failed to encode access token: {e}")))
    }
}
