//! Publish/subscribe interface for row change notifications.

use std::sync::Arc;

use async_trait::async_trait;

use crate::events::RowChange;
use crate::result::AppResult;
use crate::types::SubscriptionId;

/// Receives change notifications for a subscribed topic.
#[async_trait]
pub trait ChangeHandler: Send + Sync + 'static {
    /// Called once per change, in publish order for a given topic.
    async fn on_change(&self, change: RowChange);
}

/// A push-based notification stream of row-level changes.
///
/// The transport behind it is an implementation detail: in-process
/// broadcast, a WebSocket bridge, or polling all satisfy the same
/// contract.
#[async_trait]
pub trait ChangeFeed: Send + Sync + std::fmt::Debug + 'static {
    /// Publish a change on `topic`. Returns the number of live subscribers
    /// that will receive it.
    async fn publish(&self, topic: &str, change: RowChange) -> AppResult<usize>;

    /// Register `handler` for every change published on `topic` from now on.
    async fn subscribe(
        &self,
        topic: &str,
        handler: Arc<dyn ChangeHandler>,
    ) -> AppResult<SubscriptionId>;

    /// Stop delivering to a subscription. Returns `false` if it was unknown.
    async fn unsubscribe(&self, id: SubscriptionId) -> AppResult<bool>;
}
