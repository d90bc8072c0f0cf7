//! Access token configuration.

use serde::{Deserialize, Serialize};

/// Access token verification settings.
///
/// Tokens are HS256 JWTs signed with `jwt_secret`, the same shape a hosted
/// auth service issues (`sub`, `exp`, `aud`, `role`, `email`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC-SHA256 secret.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Required `aud` claim. Empty disables the audience check.
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Clock skew tolerance in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
    /// TTL of locally minted development tokens, in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            audience: default_audience(),
            leeway_seconds: default_leeway(),
            access_ttl_minutes: default_access_ttl(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_audience() -> String {
    "authenticated".to_string()
}

fn default_leeway() -> u64 {
    5
}

fn default_access_ttl() -> u64 {
    60
}
