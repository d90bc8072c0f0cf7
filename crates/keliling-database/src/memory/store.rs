//! In-memory vendor store backed by `DashMap`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;

use keliling_core::result::AppResult;
use keliling_core::types::VendorId;
use keliling_entity::vendor::{CreateVendor, Vendor};

use crate::store::VendorStore;

/// In-memory vendor store.
///
/// Each `set_online` holds the entry's shard lock for the read-modify-write,
/// which gives the same per-row atomicity as a single `UPDATE`.
#[derive(Debug, Clone, Default)]
pub struct MemoryVendorStore {
    vendors: Arc<DashMap<VendorId, Vendor>>,
}

impl MemoryVendorStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored vendors.
    pub fn len(&self) -> usize {
        self.vendors.len()
    }

    /// Whether the store holds no vendors.
    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }
}

#[async_trait]
impl VendorStore for MemoryVendorStore {
    async fn find_by_id(&self, id: VendorId) -> AppResult<Option<Vendor>> {
        Ok(self.vendors.get(&id).map(|v| v.value().clone()))
    }

    async fn set_online(&self, id: VendorId, online: bool) -> AppResult<Option<Vendor>> {
        let Some(mut entry) = self.vendors.get_mut(&id) else {
            return Ok(None);
        };
        entry.online = online;
        entry.updated_at = Utc::now();
        debug!(vendor_id = %id, online, "Vendor presence written");
        Ok(Some(entry.value().clone()))
    }

    async fn list(&self) -> AppResult<Vec<Vendor>> {
        let mut vendors: Vec<Vendor> = self.vendors.iter().map(|e| e.value().clone()).collect();
        vendors.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(vendors)
    }

    async fn insert(&self, data: CreateVendor) -> AppResult<Vendor> {
        let vendor = data.into_vendor();
        self.vendors.insert(vendor.id, vendor.clone());
        Ok(vendor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keliling_core::types::UserId;

    fn create(owner: UserId, name: &str, online: bool) -> CreateVendor {
        CreateVendor {
            owner_id: owner,
            name: name.to_string(),
            description: None,
            photo_url: None,
            location: None,
            online,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryVendorStore::new();
        let vendor = store.insert(create(UserId::new(), "Sate", false)).await.unwrap();
        let found = store.find_by_id(vendor.id).await.unwrap();
        assert_eq!(found, Some(vendor));
    }

    #[tokio::test]
    async fn test_find_missing() {
        let store = MemoryVendorStore::new();
        assert!(store.find_by_id(VendorId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_online_returns_post_write_row() {
        let store = MemoryVendorStore::new();
        let vendor = store.insert(create(UserId::new(), "Sate", false)).await.unwrap();

        let updated = store.set_online(vendor.id, true).await.unwrap().unwrap();
        assert!(updated.online);
        assert!(updated.updated_at >= vendor.updated_at);
        assert!(store.find_by_id(vendor.id).await.unwrap().unwrap().online);
    }

    #[tokio::test]
    async fn test_set_online_missing_row() {
        let store = MemoryVendorStore::new();
        assert!(store.set_online(VendorId::new(), true).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let owner = UserId::new();
        let store = MemoryVendorStore::new();
        store.insert(create(owner, "Soto", true)).await.unwrap();
        store.insert(create(owner, "Bakso", false)).await.unwrap();
        store.insert(create(owner, "Martabak", true)).await.unwrap();

        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, vec!["Bakso", "Martabak", "Soto"]);
        assert_eq!(store.len(), 3);
    }
}
