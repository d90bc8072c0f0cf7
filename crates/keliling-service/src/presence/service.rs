//! Presence update: authorize, resolve, persist, publish.

use std::sync::Arc;

use tracing::{info, warn};

use keliling_core::error::AppError;
use keliling_core::events::{RowChange, VENDORS_TOPIC};
use keliling_core::result::AppResult;
use keliling_core::traits::ChangeFeed;
use keliling_core::types::VendorId;
use keliling_database::VendorStore;
use keliling_entity::vendor::Vendor;

use crate::context::RequestContext;

use super::request::PresenceRequest;

/// Message for the ownership check.
pub const NOT_OWNER: &str = "Not allowed: you are not owner of this vendor";

/// Writes vendor presence on behalf of the owning principal.
#[derive(Debug, Clone)]
pub struct PresenceService {
    store: Arc<dyn VendorStore>,
    feed: Arc<dyn ChangeFeed>,
}

impl PresenceService {
    /// Creates a new presence service.
    pub fn new(store: Arc<dyn VendorStore>, feed: Arc<dyn ChangeFeed>) -> Self {
        Self { store, feed }
    }

    /// Set or flip the presence flag of `vendor_id`.
    ///
    /// Returns the post-write row. Only the owner may write; the stored
    /// value is never touched on any error path.
    pub async fn update_presence(
        &self,
        ctx: &RequestContext,
        vendor_id: VendorId,
        request: PresenceRequest,
    ) -> AppResult<Vendor> {
        let vendor = self
            .store
            .find_by_id(vendor_id)
            .await?
            .ok_or_else(|| AppError::not_found("Vendor not found"))?;

        if !vendor.is_owned_by(&ctx.user_id()) {
            warn!(
                vendor_id = %vendor_id,
                user_id = %ctx.user_id(),
                "Presence update rejected: caller is not the owner"
            );
            return Err(AppError::forbidden(NOT_OWNER));
        }

        let online = request.resolve(vendor.online);

        let updated = self
            .store
            .set_online(vendor_id, online)
            .await?
            .ok_or_else(|| AppError::not_found("Vendor not found"))?;

        info!(
            vendor_id = %vendor_id,
            user_id = %ctx.user_id(),
            online = updated.online,
            explicit = request.online.is_some(),
            "Vendor presence updated"
        );

        self.publish(&updated).await;
        Ok(updated)
    }

    /// Broadcast the new row. Failures are logged only; the write stands.
    async fn publish(&self, vendor: &Vendor) {
        let change = match RowChange::updated(VENDORS_TOPIC, vendor) {
            Ok(change) => change,
            Err(e) => {
                warn!(vendor_id = %vendor.id, error = %e, "Failed to encode vendor change");
                return;
            }
        };

        if let Err(e) = self.feed.publish(VENDORS_TOPIC, change).await {
            warn!(vendor_id = %vendor.id, error = %e, "Failed to publish vendor change");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use std::sync::Mutex;

    use keliling_core::error::ErrorKind;
    use keliling_core::traits::ChangeHandler;
    use keliling_core::types::{Principal, SubscriptionId, UserId};
    use keliling_database::memory::MemoryVendorStore;
    use keliling_entity::vendor::CreateVendor;

    #[derive(Debug, Default)]
    struct RecordingFeed {
        published: Mutex<Vec<(String, RowChange)>>,
    }

    #[async_trait]
    impl ChangeFeed for RecordingFeed {
        async fn publish(&self, topic: &str, change: RowChange) -> AppResult<usize> {
            self.published
                .lock()
                .unwrap()
                .push((topic.to_string(), change));
            Ok(0)
        }

        async fn subscribe(
            &self,
            _topic: &str,
            _handler: Arc<dyn ChangeHandler>,
        ) -> AppResult<SubscriptionId> {
            Ok(SubscriptionId::new())
        }

        async fn unsubscribe(&self, _id: SubscriptionId) -> AppResult<bool> {
            Ok(false)
        }
    }

    struct Fixture {
        service: PresenceService,
        store: Arc<MemoryVendorStore>,
        feed: Arc<RecordingFeed>,
        owner: UserId,
        vendor_id: VendorId,
    }

    async fn fixture(online: bool) -> Fixture {
        let store = Arc::new(MemoryVendorStore::new());
        let feed = Arc::new(RecordingFeed::default());
        let owner = UserId::new();
        let vendor = store
            .insert(CreateVendor {
                owner_id: owner,
                name: "Es Cendol".to_string(),
                description: None,
                photo_url: None,
                location: None,
                online,
            })
            .await
            .unwrap();
        Fixture {
            service: PresenceService::new(store.clone(), feed.clone()),
            store,
            feed,
            owner,
            vendor_id: vendor.id,
        }
    }

    fn ctx(user: UserId) -> RequestContext {
        RequestContext::new(Principal::new(user), None)
    }

    #[tokio::test]
    async fn test_explicit_value_written() {
        let f = fixture(false).await;
        let updated = f
            .service
            .update_presence(&ctx(f.owner), f.vendor_id, PresenceRequest::set(true))
            .await
            .unwrap();
        assert!(updated.online);
        assert!(f.store.find_by_id(f.vendor_id).await.unwrap().unwrap().online);
    }

    #[tokio::test]
    async fn test_explicit_value_idempotent() {
        let f = fixture(false).await;
        for _ in 0..3 {
            let updated = f
                .service
                .update_presence(&ctx(f.owner), f.vendor_id, PresenceRequest::set(true))
                .await
                .unwrap();
            assert!(updated.online);
        }
    }

    #[tokio::test]
    async fn test_flip_alternates() {
        let f = fixture(false).await;
        let mut seen = Vec::new();
        for _ in 0..4 {
            let updated = f
                .service
                .update_presence(&ctx(f.owner), f.vendor_id, PresenceRequest::flip())
                .await
                .unwrap();
            seen.push(updated.online);
        }
        assert_eq!(seen, vec![true, false, true, false]);
    }

    #[tokio::test]
    async fn test_non_owner_forbidden_and_unchanged() {
        let f = fixture(false).await;
        let err = f
            .service
            .update_presence(&ctx(UserId::new()), f.vendor_id, PresenceRequest::set(true))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
        assert_eq!(err.message, NOT_OWNER);
        assert!(!f.store.find_by_id(f.vendor_id).await.unwrap().unwrap().online);
        assert!(f.feed.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_vendor() {
        let f = fixture(false).await;
        let err = f
            .service
            .update_presence(&ctx(f.owner), VendorId::new(), PresenceRequest::flip())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.message, "Vendor not found");
    }

    #[tokio::test]
    async fn test_publishes_row_change() {
        let f = fixture(false).await;
        f.service
            .update_presence(&ctx(f.owner), f.vendor_id, PresenceRequest::set(true))
            .await
            .unwrap();

        let published = f.feed.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        let (topic, change) = &published[0];
        assert_eq!(topic, VENDORS_TOPIC);
        assert_eq!(change.table, "vendors");
        assert_eq!(change.record["online"], true);
        assert_eq!(change.record["id"], f.vendor_id.to_string());
    }
}
