//! # keliling-service
//!
//! Business logic between the HTTP layer and the vendor store. Services
//! receive a [`RequestContext`] for the authenticated caller and return
//! `AppResult` values the API layer maps to responses.

pub mod context;
pub mod presence;
pub mod vendor;

pub use context::RequestContext;
pub use presence::{PresenceRequest, PresenceService};
pub use vendor::VendorService;
