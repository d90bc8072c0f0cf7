//! WebSocket connection state.

pub mod session;

pub use session::ConnectionSession;
