//! The authenticated caller.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Who is making a request, as resolved from a verified access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// The principal's user ID.
    pub user_id: UserId,
    /// Role claim carried by the token, if any (e.g. `"authenticated"`).
    pub role: Option<String>,
    /// Email claim carried by the token, if any.
    pub email: Option<String>,
}

impl Principal {
    /// Creates a principal with only a user ID.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            role: None,
            email: None,
        }
    }

    /// Whether this principal is the given user.
    pub fn is(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}
