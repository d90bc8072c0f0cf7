//! Store selection from configuration.

use std::sync::Arc;

use tracing::{debug, info};

use keliling_core::config::{DatabaseConfig, SeedConfig, StoreBackend};
use keliling_core::result::AppResult;
use keliling_entity::vendor::CreateVendor;

use crate::connection::DatabasePool;
use crate::memory::MemoryVendorStore;
use crate::migration::run_migrations;
use crate::repositories::VendorRepository;
use crate::store::VendorStore;

/// The configured vendor store plus the pool behind it, if any.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    /// The store used by the service layer.
    pub store: Arc<dyn VendorStore>,
    /// PostgreSQL pool when `database.store = "postgres"`.
    pub pool: Option<DatabasePool>,
}

impl StoreHandle {
    /// Open the store named by `config.store`.
    ///
    /// For PostgreSQL this connects the pool and, when
    /// `run_migrations` is set, applies pending migrations.
    pub async fn open(config: &DatabaseConfig) -> AppResult<Self> {
        match config.store {
            StoreBackend::Postgres => {
                let pool = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(pool.pool()).await?;
                }
                let store = VendorRepository::new(pool.pool().clone());
                Ok(Self {
                    store: Arc::new(store),
                    pool: Some(pool),
                })
            }
            StoreBackend::Memory => {
                info!("Using in-memory vendor store");
                Ok(Self::from_store(Arc::new(MemoryVendorStore::new())))
            }
        }
    }

    /// Insert `seed.vendors` if the store holds no vendors yet.
    ///
    /// Returns how many vendors were inserted. A non-empty store is left
    /// alone, so restarting against PostgreSQL does not duplicate rows.
    pub async fn seed(&self, seed: &SeedConfig) -> AppResult<usize> {
        if seed.vendors.is_empty() || !self.store.list().await?.is_empty() {
            return Ok(0);
        }

        for vendor in &seed.vendors {
            let created = self
                .store
                .insert(CreateVendor {
                    owner_id: vendor.owner_id,
                    name: vendor.name.clone(),
                    description: vendor.description.clone(),
                    photo_url: vendor.photo_url.clone(),
                    location: vendor.location(),
                    online: vendor.online,
                })
                .await?;
            debug!(vendor_id = %created.id, name = %created.name, "Seeded vendor");
        }
        info!(count = seed.vendors.len(), "Seeded vendor store");
        Ok(seed.vendors.len())
    }

    /// Wrap an existing store (for testing).
    pub fn from_store(store: Arc<dyn VendorStore>) -> Self {
        Self { store, pool: None }
    }

    /// Close the pool, if one is open.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
