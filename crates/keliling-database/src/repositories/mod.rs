//! PostgreSQL repository implementations.

pub mod vendor;

pub use vendor::VendorRepository;
