//! # keliling-core
//!
//! Core crate for Keliling. Contains configuration schemas, typed
//! identifiers, the authenticated principal, row-level change events,
//! the collaborator traits (token verification, change feed), and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other Keliling crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
