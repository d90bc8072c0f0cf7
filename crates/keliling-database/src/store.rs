//! Vendor store trait.

use async_trait::async_trait;

use keliling_core::result::AppResult;
use keliling_core::types::VendorId;
use keliling_entity::vendor::{CreateVendor, Vendor};

/// Persistence operations the presence subsystem needs.
///
/// Implementations report storage failures as
/// [`ErrorKind::Transient`](keliling_core::error::ErrorKind::Transient).
#[async_trait]
pub trait VendorStore: Send + Sync + std::fmt::Debug + 'static {
    /// Load a single vendor.
    async fn find_by_id(&self, id: VendorId) -> AppResult<Option<Vendor>>;

    /// Atomically set the presence flag and return the post-write row.
    ///
    /// Returns `None` when no row matched.
    async fn set_online(&self, id: VendorId, online: bool) -> AppResult<Option<Vendor>>;

    /// All vendors, ordered by name.
    async fn list(&self) -> AppResult<Vec<Vendor>>;

    /// Insert a new vendor.
    async fn insert(&self, data: CreateVendor) -> AppResult<Vendor>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
