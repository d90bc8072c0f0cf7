//! Change feed on the client.
//!
//! [`FeedBridge`] mirrors the server's `/ws` stream into a local
//! [`ChangeFeed`]; [`ListRefresher`] re-reads the vendor list whenever a
//! change arrives on it.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use keliling_core::events::{RowChange, VENDORS_TOPIC};
use keliling_core::result::AppResult;
use keliling_core::traits::{ChangeFeed, ChangeHandler};
use keliling_core::types::SubscriptionId;
use keliling_realtime::{InboundMessage, OutboundMessage};

use crate::error::TransportError;
use crate::session::Session;
use crate::transport::VendorDirectory;
use crate::view::VendorListView;

fn encode(message: &InboundMessage) -> Result<Message, TransportError> {
    serde_json::to_string(message)
        .map(|text| Message::Text(text.into()))
        .map_err(|e| TransportError::Decode(e.to_string()))
}

/// Live WebSocket connection republishing server changes locally.
///
/// Dropping the bridge closes the connection.
#[derive(Debug)]
pub struct FeedBridge {
    task: JoinHandle<()>,
    outbound: mpsc::Sender<InboundMessage>,
}

impl FeedBridge {
    /// Connects to the session's `/ws`, subscribes to `topics` and waits
    /// until every subscription is confirmed.
    pub async fn connect(
        session: &Session,
        topics: &[&str],
        feed: Arc<dyn ChangeFeed>,
    ) -> Result<Self, TransportError> {
        let (socket, _) = tokio_tungstenite::connect_async(session.ws_url()).await?;
        let (mut sink, mut stream) = socket.split();

        for topic in topics {
            let subscribe = InboundMessage::Subscribe {
                topic: topic.to_string(),
            };
            sink.send(encode(&subscribe)?).await?;
        }

        let mut waiting: HashSet<String> = topics.iter().map(|t| t.to_string()).collect();
        while !waiting.is_empty() {
            let Some(frame) = stream.next().await else {
                return Err(TransportError::WebSocket(
                    "Connection closed before subscribing".to_string(),
                ));
            };
            let Message::Text(text) = frame? else {
                continue;
            };
            match serde_json::from_str::<OutboundMessage>(&text) {
                Ok(OutboundMessage::Subscribed { topic }) => {
                    waiting.remove(&topic);
                }
                Ok(OutboundMessage::Error { code, message }) => {
                    return Err(TransportError::WebSocket(format!("{code}: {message}")));
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Unreadable feed message"),
            }
        }
        info!(?topics, "Change feed connected");

        let (outbound, mut outbound_rx) = mpsc::channel::<InboundMessage>(16);
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    frame = stream.next() => {
                        let text = match frame {
                            Some(Ok(Message::Text(text))) => text,
                            Some(Ok(Message::Close(_))) | None => break,
                            Some(Ok(_)) => continue,
                            Some(Err(e)) => {
                                warn!(error = %e, "Change feed read failed");
                                break;
                            }
                        };
                        match serde_json::from_str::<OutboundMessage>(&text) {
                            Ok(OutboundMessage::RowChange { topic, change }) => {
                                if let Err(e) = feed.publish(&topic, change).await {
                                    warn!(error = %e, "Failed to republish change");
                                }
                            }
                            Ok(OutboundMessage::Ping { timestamp }) => {
                                let pong = InboundMessage::Pong { timestamp };
                                if let Ok(frame) = encode(&pong)
                                    && sink.send(frame).await.is_err()
                                {
                                    break;
                                }
                            }
                            Ok(OutboundMessage::Error { code, message }) => {
                                warn!(%code, %message, "Change feed error");
                            }
                            Ok(other) => debug!(?other, "Change feed message"),
                            Err(e) => warn!(error = %e, "Unreadable feed message"),
                        }
                    }
                    Some(message) = outbound_rx.recv() => {
                        let Ok(frame) = encode(&message) else { continue };
                        if sink.send(frame).await.is_err() {
                            break;
                        }
                    }
                }
            }
            let _ = sink.close().await;
            info!("Change feed disconnected");
        });

        Ok(Self { task, outbound })
    }

    /// Asks the server to stop sending `topic`.
    pub async fn unsubscribe(&self, topic: &str) -> Result<(), TransportError> {
        self.outbound
            .send(InboundMessage::Unsubscribe {
                topic: topic.to_string(),
            })
            .await
            .map_err(|_| TransportError::WebSocket("Change feed closed".to_string()))
    }

    /// Resolves once the connection ends.
    pub async fn closed(&mut self) {
        let _ = (&mut self.task).await;
    }

    pub fn is_closed(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for FeedBridge {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Reloads the vendor list into a view.
#[derive(Debug)]
pub struct ListRefresher {
    directory: Arc<dyn VendorDirectory>,
    view: Arc<VendorListView>,
}

impl ListRefresher {
    pub fn new(directory: Arc<dyn VendorDirectory>, view: Arc<VendorListView>) -> Self {
        Self { directory, view }
    }

    /// Full reload. Returns the number of vendors read.
    pub async fn reload(&self) -> Result<usize, TransportError> {
        self.view.set_loading().await;
        match self.directory.list_vendors().await {
            Ok(vendors) => {
                let count = vendors.len();
                self.view.replace(vendors).await;
                Ok(count)
            }
            Err(e) => {
                self.view.set_failed(e.to_string()).await;
                Err(e)
            }
        }
    }

    /// Subscribes this refresher to vendor changes on `feed`.
    pub async fn attach(self: Arc<Self>, feed: &dyn ChangeFeed) -> AppResult<SubscriptionId> {
        feed.subscribe(VENDORS_TOPIC, self).await
    }
}

#[async_trait]
impl ChangeHandler for ListRefresher {
    async fn on_change(&self, change: RowChange) {
        debug!(table = %change.table, kind = ?change.kind, "Vendor change, reloading");
        if let Err(e) = self.reload().await {
            warn!(error = %e, "Vendor list reload failed");
        }
    }
}
