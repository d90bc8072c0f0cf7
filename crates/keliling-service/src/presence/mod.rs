//! Vendor presence updates.

pub mod request;
pub mod service;

pub use request::PresenceRequest;
pub use service::PresenceService;
