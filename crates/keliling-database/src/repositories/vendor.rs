//! Vendor repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use keliling_core::error::{AppError, ErrorKind};
use keliling_core::result::AppResult;
use keliling_core::types::VendorId;
use keliling_entity::vendor::{CreateVendor, Vendor};

use crate::store::VendorStore;

/// Repository for vendor presence records.
#[derive(Debug, Clone)]
pub struct VendorRepository {
    pool: PgPool,
}

impl VendorRepository {
    /// Create a new vendor repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VendorStore for VendorRepository {
    async fn find_by_id(&self, id: VendorId) -> AppResult<Option<Vendor>> {
        sqlx::query_as::<_, Vendor>("SELECT * FROM vendors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Transient, "Failed to read vendor", e))
    }

    async fn set_online(&self, id: VendorId, online: bool) -> AppResult<Option<Vendor>> {
        sqlx::query_as::<_, Vendor>(
            "UPDATE vendors SET online = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(online)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Transient, "Failed to update vendor status", e)
        })
    }

    async fn list(&self) -> AppResult<Vec<Vendor>> {
        sqlx::query_as::<_, Vendor>("SELECT * FROM vendors ORDER BY name ASC, id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Transient, "Failed to list vendors", e))
    }

    async fn insert(&self, data: CreateVendor) -> AppResult<Vendor> {
        let vendor = data.into_vendor();
        sqlx::query_as::<_, Vendor>(
            "INSERT INTO vendors (id, owner_id, name, description, photo_url, location, online, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *",
        )
        .bind(vendor.id)
        .bind(vendor.owner_id)
        .bind(&vendor.name)
        .bind(&vendor.description)
        .bind(&vendor.photo_url)
        .bind(&vendor.location)
        .bind(vendor.online)
        .bind(vendor.created_at)
        .bind(vendor.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Transient, "Failed to create vendor", e))
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Transient, "Health check failed", e))
    }
}
