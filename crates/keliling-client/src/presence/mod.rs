//! Optimistic presence toggling.

pub mod state;
pub mod toggle;

pub use state::{ToggleEvent, TogglePhase, reduce};
pub use toggle::{PresenceToggle, ToggleOutcome};
