//! Topic definitions and parsing.

use std::fmt;

use keliling_core::events::{RowChange, VENDORS_TOPIC};
use keliling_core::types::VendorId;

/// Topics a WebSocket client may subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Every change to the `vendors` table.
    Vendors,
    /// Changes to a single vendor row.
    Vendor(VendorId),
}

impl Topic {
    /// Parses `"vendors"` or `"vendors:{uuid}"`.
    pub fn parse(topic: &str) -> Option<Self> {
        match topic.split_once(':') {
            None if topic == VENDORS_TOPIC => Some(Topic::Vendors),
            Some((VENDORS_TOPIC, id)) => id.parse().ok().map(Topic::Vendor),
            _ => None,
        }
    }

    /// The feed topic the changes are published on.
    pub fn feed_topic(&self) -> &'static str {
        match self {
            Topic::Vendors | Topic::Vendor(_) => VENDORS_TOPIC,
        }
    }

    /// Whether `change` belongs to this topic.
    pub fn matches(&self, change: &RowChange) -> bool {
        match self {
            Topic::Vendors => change.table == VENDORS_TOPIC,
            Topic::Vendor(id) => {
                change.table == VENDORS_TOPIC
                    && change
                        .record
                        .get("id")
                        .and_then(|v| v.as_str())
                        .is_some_and(|s| s == id.to_string())
            }
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Vendors => f.write_str(VENDORS_TOPIC),
            Topic::Vendor(id) => write!(f, "{VENDORS_TOPIC}:{id}"),
        }
    }
}
