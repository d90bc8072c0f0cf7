//! Process-local vendor store.

pub mod store;

pub use store::MemoryVendorStore;
