//! The signed-in session every client component is built with.

use keliling_core::types::{Principal, UserId, VendorId};

/// Server origin, credential and identity of the signed-in user.
#[derive(Debug, Clone)]
pub struct Session {
    origin: String,
    access_token: String,
    principal: Principal,
    owned_vendor: Option<VendorId>,
}

impl Session {
    /// Creates a session for `principal` against `origin`
    /// (e.g. `http://localhost:4000`).
    pub fn new(origin: impl Into<String>, access_token: impl Into<String>, principal: Principal) -> Self {
        let origin: String = origin.into();
        Self {
            origin: origin.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            principal,
            owned_vendor: None,
        }
    }

    /// Records the vendor this user owns.
    pub fn with_owned_vendor(mut self, vendor_id: VendorId) -> Self {
        self.owned_vendor = Some(vendor_id);
        self
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }

    pub fn owned_vendor(&self) -> Option<VendorId> {
        self.owned_vendor
    }

    /// Whether this session may toggle `vendor_id`.
    pub fn owns(&self, vendor_id: VendorId) -> bool {
        self.owned_vendor == Some(vendor_id)
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.origin, path.trim_start_matches('/'))
    }

    /// WebSocket URL of the change feed, carrying the access token.
    pub fn ws_url(&self) -> String {
        let base = if let Some(rest) = self.origin.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.origin.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.origin.clone()
        };
        format!("{base}/ws?token={}", self.access_token)
    }
}
