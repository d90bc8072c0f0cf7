//! Request context carrying the authenticated principal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use keliling_core::types::{Principal, UserId};

/// Context for the current authenticated request.
///
/// Built by the auth extractor and passed into service methods so every
/// operation knows who is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The verified caller.
    pub principal: Principal,
    /// IP address of the request origin, when known.
    pub ip_address: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(principal: Principal, ip_address: Option<String>) -> Self {
        Self {
            principal,
            ip_address,
            request_time: Utc::now(),
        }
    }

    /// The caller's user ID.
    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }
}
