//! `reqwest` implementation of the transports.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::debug;

use keliling_core::types::VendorId;
use keliling_entity::vendor::VendorSummary;

use crate::error::TransportError;
use crate::session::Session;

use super::{PresenceTransport, VendorDirectory};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct PresenceBody {
    online: Option<bool>,
}

impl PresenceBody {
    /// The stored value, or the requested one when the server omits it.
    fn confirmed_or(&self, requested: bool) -> bool {
        self.online.unwrap_or(requested)
    }
}

#[derive(Debug, Deserialize)]
struct VendorListBody {
    vendors: Vec<VendorSummary>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    code: Option<String>,
}

/// HTTP client bound to a session.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    session: Arc<Session>,
    client: Client,
}

impl HttpTransport {
    pub fn new(session: Arc<Session>) -> Result<Self, TransportError> {
        Self::with_timeout(session, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(session: Arc<Session>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { session, client })
    }

    /// Turns a non-2xx response into [`TransportError::Status`].
    async fn check(response: Response) -> Result<Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let reason = status.canonical_reason().unwrap_or("error").to_string();
        let (message, code) = match response.json::<ErrorBody>().await {
            Ok(body) => (body.error, body.code),
            Err(_) => (reason, None),
        };
        Err(TransportError::Status {
            status: status.as_u16(),
            message,
            code,
        })
    }
}

#[async_trait]
impl PresenceTransport for HttpTransport {
    async fn set_online(&self, vendor_id: VendorId, online: bool) -> Result<bool, TransportError> {
        let url = self.session.url(&format!("/api/vendor/{vendor_id}/online"));
        debug!(%url, online, "Sending presence update");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.session.access_token())
            .json(&serde_json::json!({ "online": online }))
            .send()
            .await?;

        let body: PresenceBody = Self::check(response).await?.json().await?;
        Ok(body.confirmed_or(online))
    }
}

#[async_trait]
impl VendorDirectory for HttpTransport {
    async fn list_vendors(&self) -> Result<Vec<VendorSummary>, TransportError> {
        let url = self.session.url("/api/vendors");
        let response = self.client.get(&url).send().await?;
        let body: VendorListBody = Self::check(response).await?.json().await?;
        Ok(body.vendors)
    }
}
