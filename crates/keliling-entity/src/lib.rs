//! # keliling-entity
//!
//! Domain entity models for Keliling. [`vendor::Vendor`] mirrors a row of
//! the `vendors` table and derives `sqlx::FromRow`; [`location::GeoPoint`]
//! is the value object the map layer works with.

pub mod location;
pub mod vendor;
