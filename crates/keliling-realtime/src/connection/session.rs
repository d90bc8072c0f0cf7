//! One WebSocket client's view of the change feed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};
use uuid::Uuid;

use keliling_core::events::RowChange;
use keliling_core::traits::{ChangeFeed, ChangeHandler};
use keliling_core::types::UserId;

use crate::channel::subscription::SubscriptionTracker;
use crate::channel::types::Topic;
use crate::message::types::{InboundMessage, OutboundMessage};

/// Forwards matching changes into a connection's outbound queue.
struct ForwardingHandler {
    topic: Topic,
    outbound: mpsc::Sender<OutboundMessage>,
}

#[async_trait]
impl ChangeHandler for ForwardingHandler {
    async fn on_change(&self, change: RowChange) {
        if !self.topic.matches(&change) {
            return;
        }
        let msg = OutboundMessage::RowChange {
            topic: self.topic.to_string(),
            change,
        };
        enqueue(&self.outbound, msg);
    }
}

/// Queues a message without waiting. A full queue drops the message.
fn enqueue(outbound: &mpsc::Sender<OutboundMessage>, msg: OutboundMessage) -> bool {
    match outbound.try_send(msg) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            warn!("Outbound queue full, dropping message");
            false
        }
        // Socket is going away.
        Err(TrySendError::Closed(_)) => false,
    }
}

/// Subscription state of a single WebSocket connection.
///
/// Replies and row changes are written to the outbound queue without
/// blocking; a separate writer task drains it. Call [`close`](Self::close)
/// when the socket ends.
pub struct ConnectionSession {
    /// Connection ID (for logging).
    pub id: Uuid,
    /// Authenticated user.
    pub user_id: UserId,
    feed: Arc<dyn ChangeFeed>,
    outbound: mpsc::Sender<OutboundMessage>,
    subscriptions: SubscriptionTracker,
    max_subscriptions: usize,
}

impl std::fmt::Debug for ConnectionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSession")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("subscriptions", &self.subscriptions.count())
            .finish()
    }
}

impl ConnectionSession {
    /// Creates a session writing to `outbound`.
    pub fn new(
        user_id: UserId,
        feed: Arc<dyn ChangeFeed>,
        outbound: mpsc::Sender<OutboundMessage>,
        max_subscriptions: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            feed,
            outbound,
            subscriptions: SubscriptionTracker::new(),
            max_subscriptions,
        }
    }

    /// Number of active topic subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.count()
    }

    /// Handles one inbound text frame.
    pub async fn handle_text(&self, text: &str) {
        match serde_json::from_str::<InboundMessage>(text) {
            Ok(msg) => self.handle(msg).await,
            Err(e) => {
                debug!(conn_id = %self.id, error = %e, "Unparseable WebSocket message");
                self.reply(OutboundMessage::error("BAD_MESSAGE", "Invalid message"))
                    .await;
            }
        }
    }

    /// Handles one decoded inbound message.
    pub async fn handle(&self, msg: InboundMessage) {
        match msg {
            InboundMessage::Subscribe { topic } => self.subscribe(&topic).await,
            InboundMessage::Unsubscribe { topic } => self.unsubscribe(&topic).await,
            InboundMessage::Pong { timestamp } => {
                debug!(
                    conn_id = %self.id,
                    rtt_ms = Utc::now().timestamp_millis() - timestamp,
                    "Pong"
                );
            }
        }
    }

    /// Drops every feed subscription held by this connection.
    pub async fn close(&self) {
        for id in self.subscriptions.drain() {
            if let Err(e) = self.feed.unsubscribe(id).await {
                warn!(conn_id = %self.id, error = %e, "Failed to release subscription");
            }
        }
    }

    async fn subscribe(&self, raw: &str) {
        let Some(topic) = Topic::parse(raw) else {
            self.reply(OutboundMessage::error(
                "UNKNOWN_TOPIC",
                format!("Unknown topic: {raw}"),
            ))
            .await;
            return;
        };

        if self.subscriptions.contains(&topic) {
            self.reply(OutboundMessage::Subscribed {
                topic: topic.to_string(),
            })
            .await;
            return;
        }

        if self.subscriptions.count() >= self.max_subscriptions {
            self.reply(OutboundMessage::error(
                "TOO_MANY_SUBSCRIPTIONS",
                "Subscription limit reached",
            ))
            .await;
            return;
        }

        let handler = Arc::new(ForwardingHandler {
            topic,
            outbound: self.outbound.clone(),
        });
        match self.feed.subscribe(topic.feed_topic(), handler).await {
            Ok(id) => {
                self.subscriptions.add(topic, id);
                debug!(conn_id = %self.id, topic = %topic, "Connection subscribed");
                self.reply(OutboundMessage::Subscribed {
                    topic: topic.to_string(),
                })
                .await;
            }
            Err(e) => {
                warn!(conn_id = %self.id, topic = %topic, error = %e, "Subscribe failed");
                self.reply(OutboundMessage::error(e.kind.code(), "Subscribe failed"))
                    .await;
            }
        }
    }

    async fn unsubscribe(&self, raw: &str) {
        let Some(topic) = Topic::parse(raw) else {
            self.reply(OutboundMessage::error(
                "UNKNOWN_TOPIC",
                format!("Unknown topic: {raw}"),
            ))
            .await;
            return;
        };

        if let Some(id) = self.subscriptions.remove(&topic)
            && let Err(e) = self.feed.unsubscribe(id).await
        {
            warn!(conn_id = %self.id, topic = %topic, error = %e, "Unsubscribe failed");
        }
        self.reply(OutboundMessage::Unsubscribed {
            topic: topic.to_string(),
        })
        .await;
    }

    async fn reply(&self, msg: OutboundMessage) {
        if !enqueue(&self.outbound, msg) {
            debug!(conn_id = %self.id, "Reply not queued");
        }
    }
}
