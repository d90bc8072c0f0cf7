//! # keliling-database
//!
//! The [`VendorStore`] abstraction over vendor presence records, its
//! PostgreSQL implementation ([`repositories::VendorRepository`]) and a
//! process-local one ([`memory::MemoryVendorStore`]).

pub mod connection;
pub mod memory;
pub mod migration;
pub mod provider;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use provider::StoreHandle;
pub use store::VendorStore;
