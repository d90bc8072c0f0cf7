//! The row change payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened to the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// A row was inserted.
    Insert,
    /// A row was updated.
    Update,
    /// A row was deleted.
    Delete,
}

/// A single row-level change in the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowChange {
    /// Unique change ID.
    pub id: Uuid,
    /// Table the row belongs to. Doubles as the feed topic.
    pub table: String,
    /// Kind of change.
    pub kind: ChangeKind,
    /// The row after the change (`null` for deletes).
    pub record: serde_json::Value,
    /// When the change was observed.
    pub timestamp: DateTime<Utc>,
}

impl RowChange {
    /// Create a new change notification for `table`.
    pub fn new(table: impl Into<String>, kind: ChangeKind, record: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            table: table.into(),
            kind,
            record,
            timestamp: Utc::now(),
        }
    }

    /// Convenience constructor for an update of a serializable row.
    pub fn updated<T: Serialize>(
        table: impl Into<String>,
        row: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(table, ChangeKind::Update, serde_json::to_value(row)?))
    }
}
