//! Request handlers.

pub mod health;
pub mod vendor;
pub mod ws;
