//! Inbound and outbound WebSocket message type definitions.

use serde::{Deserialize, Serialize};

use keliling_core::events::RowChange;

/// Messages sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Subscribe to a topic.
    Subscribe {
        /// Topic name, e.g. `"vendors"`.
        topic: String,
    },
    /// Unsubscribe from a topic.
    Unsubscribe {
        /// Topic name.
        topic: String,
    },
    /// Pong response to server ping.
    Pong {
        /// Echoed timestamp.
        timestamp: i64,
    },
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Subscription confirmed.
    Subscribed {
        /// Topic name.
        topic: String,
    },
    /// Unsubscription confirmed.
    Unsubscribed {
        /// Topic name.
        topic: String,
    },
    /// A row changed.
    RowChange {
        /// Topic the client subscribed with.
        topic: String,
        /// The change itself.
        change: RowChange,
    },
    /// Ping (server keepalive).
    Ping {
        /// Server timestamp (milliseconds since epoch).
        timestamp: i64,
    },
    /// Error message.
    Error {
        /// Error code.
        code: String,
        /// Error description.
        message: String,
    },
}

impl OutboundMessage {
    /// Builds an error message.
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Serializes to the JSON text frame payload.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
