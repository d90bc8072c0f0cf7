//! Geographic value objects.

pub mod point;

pub use point::{EARTH_RADIUS_M, GeoPoint, haversine_m};
