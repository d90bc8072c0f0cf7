//! Client error types.

use thiserror::Error;

use keliling_core::types::VendorId;

/// Failure talking to the server.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, connect, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("Server returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// The `error` field of the body, or the status reason.
        message: String,
        /// The `code` field of the body, if present.
        code: Option<String>,
    },

    /// A 2xx response whose body could not be understood.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// WebSocket handshake or frame failure.
    #[error("WebSocket error: {0}")]
    WebSocket(String),
}

impl TransportError {
    /// HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server rejected the caller's credential or ownership.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// Whether asking the user to try again makes sense.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Network(_) | Self::Decode(_) | Self::WebSocket(_) => true,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(err.to_string())
    }
}

/// A toggle that was refused before any request was sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToggleError {
    /// The session does not own the vendor.
    #[error("Not allowed: you are not owner of vendor {vendor_id}")]
    NotOwner {
        /// The vendor the caller tried to toggle.
        vendor_id: VendorId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> TransportError {
        TransportError::Status {
            status: code,
            message: "x".to_string(),
            code: None,
        }
    }

    #[test]
    fn test_auth_rejections_not_retryable() {
        assert!(status(401).is_auth_rejection());
        assert!(status(403).is_auth_rejection());
        assert!(!status(403).is_retryable());
        assert!(!status(404).is_retryable());
    }

    #[test]
    fn test_server_failures_retryable() {
        assert!(status(500).is_retryable());
        assert!(status(429).is_retryable());
        assert!(TransportError::Network("reset".to_string()).is_retryable());
    }
}
