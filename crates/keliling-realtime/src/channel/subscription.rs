//! Per-connection subscription tracking.

use dashmap::DashMap;

use keliling_core::types::SubscriptionId;

use super::types::Topic;

/// Maps a connection's topics to their feed subscriptions.
#[derive(Debug, Default)]
pub struct SubscriptionTracker {
    by_topic: DashMap<Topic, SubscriptionId>,
}

impl SubscriptionTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `topic` is already subscribed.
    pub fn contains(&self, topic: &Topic) -> bool {
        self.by_topic.contains_key(topic)
    }

    /// Records a subscription.
    pub fn add(&self, topic: Topic, id: SubscriptionId) {
        self.by_topic.insert(topic, id);
    }

    /// Removes a subscription, returning its feed ID.
    pub fn remove(&self, topic: &Topic) -> Option<SubscriptionId> {
        self.by_topic.remove(topic).map(|(_, id)| id)
    }

    /// Removes every subscription, returning the feed IDs.
    pub fn drain(&self) -> Vec<SubscriptionId> {
        let topics: Vec<Topic> = self.by_topic.iter().map(|e| *e.key()).collect();
        topics
            .iter()
            .filter_map(|topic| self.remove(topic))
            .collect()
    }

    /// Number of subscriptions.
    pub fn count(&self) -> usize {
        self.by_topic.len()
    }
}
