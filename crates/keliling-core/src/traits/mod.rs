//! Collaborator traits defined in `keliling-core` and implemented by
//! other crates.

pub mod change_feed;
pub mod token_verifier;

pub use change_feed::{ChangeFeed, ChangeHandler};
pub use token_verifier::TokenVerifier;
