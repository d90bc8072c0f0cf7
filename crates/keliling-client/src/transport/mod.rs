//! Server access used by the toggle and the list view.

pub mod http;

use async_trait::async_trait;

use keliling_core::types::VendorId;
use keliling_entity::vendor::VendorSummary;

use crate::error::TransportError;

pub use http::HttpTransport;

/// Sends presence updates.
#[async_trait]
pub trait PresenceTransport: Send + Sync + std::fmt::Debug + 'static {
    /// Requests `online` for `vendor_id` and returns the value the server
    /// stored.
    async fn set_online(&self, vendor_id: VendorId, online: bool) -> Result<bool, TransportError>;
}

/// Reads the public vendor list.
#[async_trait]
pub trait VendorDirectory: Send + Sync + std::fmt::Debug + 'static {
    async fn list_vendors(&self) -> Result<Vec<VendorSummary>, TransportError>;
}
