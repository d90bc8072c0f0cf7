//! Row-level change notifications.
//!
//! Every successful write to a watched table produces a [`RowChange`]
//! which is published on the change feed under the table's topic. List
//! views subscribe to the topic and re-fetch when a change arrives.

pub mod change;

pub use change::{ChangeKind, RowChange};

/// Topic carrying changes to the `vendors` table.
pub const VENDORS_TOPIC: &str = "vendors";
