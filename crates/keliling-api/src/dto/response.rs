//! Response DTOs.

use serde::{Deserialize, Serialize};

use keliling_entity::vendor::{Vendor, VendorSummary};

/// `GET /` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Result of a presence update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceResponse {
    /// Always `true`.
    pub ok: bool,
    /// The stored presence after the write.
    pub online: bool,
    /// The full post-write row.
    pub vendor: Vendor,
}

impl PresenceResponse {
    /// Builds the response from the post-write row.
    pub fn new(vendor: Vendor) -> Self {
        Self {
            ok: true,
            online: vendor.online,
            vendor,
        }
    }
}

/// Public vendor listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorListResponse {
    pub ok: bool,
    pub vendors: Vec<VendorSummary>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since the server started.
    pub uptime_seconds: u64,
    /// Whether the vendor store answered its health check.
    pub store: bool,
}
