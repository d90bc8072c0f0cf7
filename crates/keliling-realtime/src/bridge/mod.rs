//! Change feed implementations.

pub mod memory_feed;
