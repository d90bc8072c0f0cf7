//! Topics and subscription bookkeeping.

pub mod subscription;
pub mod types;

pub use subscription::SubscriptionTracker;
pub use types::Topic;
