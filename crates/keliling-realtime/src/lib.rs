//! # keliling-realtime
//!
//! Row change notifications for Keliling:
//!
//! - [`MemoryChangeFeed`], the process-local [`ChangeFeed`](keliling_core::traits::ChangeFeed)
//! - typed topics and per-connection subscription tracking
//! - the JSON messages exchanged over `/ws`
//! - [`ConnectionSession`], which drives one WebSocket client's subscriptions

pub mod bridge;
pub mod channel;
pub mod connection;
pub mod message;

pub use bridge::memory_feed::MemoryChangeFeed;
pub use channel::types::Topic;
pub use connection::session::ConnectionSession;
pub use message::types::{InboundMessage, OutboundMessage};
