//! # keliling-client
//!
//! Client side of the presence protocol:
//!
//! - [`PresenceToggle`], the optimistic toggle with revert on failure
//! - [`VendorListView`], the local projection the map renders
//! - [`FeedBridge`], which mirrors the server's `/ws` feed into a local
//!   [`ChangeFeed`](keliling_core::traits::ChangeFeed)
//! - [`VendorFilter`], text and radius discovery filtering
//!
//! Every component receives an `Arc<Session>` at construction.

pub mod discovery;
pub mod error;
pub mod feed;
pub mod notify;
pub mod presence;
pub mod session;
pub mod transport;
pub mod view;

pub use discovery::VendorFilter;
pub use error::{ToggleError, TransportError};
pub use feed::{FeedBridge, ListRefresher};
pub use notify::{Notice, NoticeLevel, Notifier, TracingNotifier};
pub use presence::{PresenceToggle, ToggleOutcome};
pub use session::Session;
pub use transport::{HttpTransport, PresenceTransport, VendorDirectory};
pub use view::VendorListView;
