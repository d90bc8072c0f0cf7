//! In-memory change feed for single-node deployments.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use keliling_core::events::RowChange;
use keliling_core::result::AppResult;
use keliling_core::traits::{ChangeFeed, ChangeHandler};
use keliling_core::types::SubscriptionId;

/// A live subscription: its topic and the task delivering to the handler.
#[derive(Debug)]
struct Subscription {
    topic: String,
    task: JoinHandle<()>,
}

/// Broadcast-channel backed [`ChangeFeed`].
///
/// Each topic owns one `broadcast` channel; each subscription owns one
/// task that forwards received changes to its handler in order.
#[derive(Debug)]
pub struct MemoryChangeFeed {
    /// Topic → broadcast sender.
    topics: DashMap<String, broadcast::Sender<RowChange>>,
    /// Subscription ID → delivery task.
    subscriptions: DashMap<SubscriptionId, Subscription>,
    /// Buffer size for new topic channels.
    buffer_size: usize,
}

impl MemoryChangeFeed {
    /// Create a new feed whose topic channels hold `buffer_size` changes.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            topics: DashMap::new(),
            subscriptions: DashMap::new(),
            buffer_size: buffer_size.max(1),
        }
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Number of live subscriptions on `topic`.
    pub fn topic_subscriber_count(&self, topic: &str) -> usize {
        self.subscriptions
            .iter()
            .filter(|entry| entry.value().topic == topic)
            .count()
    }

    fn sender(&self, topic: &str) -> broadcast::Sender<RowChange> {
        self.topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer_size).0)
            .clone()
    }
}

impl Default for MemoryChangeFeed {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Drop for MemoryChangeFeed {
    fn drop(&mut self) {
        for entry in self.subscriptions.iter() {
            entry.value().task.abort();
        }
    }
}

#[async_trait]
impl ChangeFeed for MemoryChangeFeed {
    async fn publish(&self, topic: &str, change: RowChange) -> AppResult<usize> {
        let Some(tx) = self.topics.get(topic).map(|tx| tx.clone()) else {
            debug!(topic, "No subscribers for topic");
            return Ok(0);
        };
        // `send` only fails when every receiver is gone.
        Ok(tx.send(change).unwrap_or(0))
    }

    async fn subscribe(
        &self,
        topic: &str,
        handler: Arc<dyn ChangeHandler>,
    ) -> AppResult<SubscriptionId> {
        let id = SubscriptionId::new();
        let mut rx = self.sender(topic).subscribe();
        let topic_name = topic.to_string();

        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(change) => handler.on_change(change).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(subscription_id = %id, topic = %topic_name, skipped, "Subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        self.subscriptions.insert(
            id,
            Subscription {
                topic: topic.to_string(),
                task,
            },
        );
        debug!(subscription_id = %id, topic, "Subscribed");
        Ok(id)
    }

    async fn unsubscribe(&self, id: SubscriptionId) -> AppResult<bool> {
        match self.subscriptions.remove(&id) {
            Some((_, subscription)) => {
                subscription.task.abort();
                debug!(subscription_id = %id, topic = %subscription.topic, "Unsubscribed");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use keliling_core::events::ChangeKind;
    use serde_json::json;
    use tokio::sync::mpsc;

    struct ChannelHandler(mpsc::UnboundedSender<RowChange>);

    #[async_trait]
    impl ChangeHandler for ChannelHandler {
        async fn on_change(&self, change: RowChange) {
            let _ = self.0.send(change);
        }
    }

    fn change(n: i64) -> RowChange {
        RowChange::new("vendors", ChangeKind::Update, json!({ "n": n }))
    }

    async fn recv(rx: &mut mpsc::UnboundedReceiver<RowChange>) -> Option<RowChange> {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .ok()
            .flatten()
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let feed = MemoryChangeFeed::new(8);
        assert_eq!(feed.publish("vendors", change(1)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delivers_in_order() {
        let feed = MemoryChangeFeed::new(8);
        let (tx, mut rx) = mpsc::unbounded_channel();
        feed.subscribe("vendors", Arc::new(ChannelHandler(tx)))
            .await
            .unwrap();

        assert_eq!(feed.publish("vendors", change(1)).await.unwrap(), 1);
        feed.publish("vendors", change(2)).await.unwrap();

        assert_eq!(recv(&mut rx).await.unwrap().record["n"], 1);
        assert_eq!(recv(&mut rx).await.unwrap().record["n"], 2);
    }

    #[tokio::test]
    async fn test_topics_are_isolated() {
        let feed = MemoryChangeFeed::new(8);
        let (tx, mut rx) = mpsc::unbounded_channel();
        feed.subscribe("chats", Arc::new(ChannelHandler(tx)))
            .await
            .unwrap();

        feed.publish("vendors", change(1)).await.unwrap();
        assert!(
            tokio::time::timeout(Duration::from_millis(50), rx.recv())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let feed = MemoryChangeFeed::new(8);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = feed
            .subscribe("vendors", Arc::new(ChannelHandler(tx)))
            .await
            .unwrap();
        assert_eq!(feed.topic_subscriber_count("vendors"), 1);

        assert!(feed.unsubscribe(id).await.unwrap());
        assert!(!feed.unsubscribe(id).await.unwrap());
        assert_eq!(feed.subscription_count(), 0);

        feed.publish("vendors", change(1)).await.unwrap();
        // The aborted task drops its handler, closing the channel.
        assert!(recv(&mut rx).await.is_none());
    }
}
