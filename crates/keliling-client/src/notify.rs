//! User-visible notices.

use std::fmt::Debug;

use tracing::{info, warn};

use keliling_core::types::VendorId;

use crate::error::TransportError;

/// Whether a notice reports success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A message a UI should surface to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub vendor_id: Option<VendorId>,
    pub message: String,
    /// `false` for authorization rejections, where retrying cannot help.
    pub retryable: bool,
}

impl Notice {
    /// Notice for a presence update the server stored.
    pub fn toggle_confirmed(vendor_id: VendorId, online: bool) -> Self {
        let status = if online { "Online" } else { "Offline" };
        Self {
            level: NoticeLevel::Success,
            vendor_id: Some(vendor_id),
            message: format!("Status: {status}"),
            retryable: false,
        }
    }

    /// Notice for a failed presence update.
    pub fn toggle_failed(vendor_id: VendorId, err: &TransportError) -> Self {
        let reason = match err {
            TransportError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Self {
            level: NoticeLevel::Error,
            vendor_id: Some(vendor_id),
            message: format!("Failed to update status: {reason}"),
            retryable: err.is_retryable(),
        }
    }
}

/// Sink for [`Notice`]s.
pub trait Notifier: Send + Sync + Debug + 'static {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => info!(vendor_id = ?notice.vendor_id, "{}", notice.message),
            NoticeLevel::Error => warn!(
                vendor_id = ?notice.vendor_id,
                retryable = notice.retryable,
                "{}",
                notice.message
            ),
        }
    }
}
