//! Latitude/longitude points and great-circle distance.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Decode a stored location.
    ///
    /// Accepted shapes:
    /// - `{ "lat": .., "lng": .. }` when both are numbers
    /// - GeoJSON `{ "type": "Point", "coordinates": [lng, lat] }`
    /// - any object with `"coordinates": [lng, lat]`
    ///
    /// Anything else, including non-finite numbers, yields `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let lat = obj.get("lat").and_then(Value::as_f64);
        let lng = obj.get("lng").and_then(Value::as_f64);
        if let (Some(lat), Some(lng)) = (lat, lng) {
            return Self::checked(lat, lng);
        }

        let coords = obj.get("coordinates")?.as_array()?;
        if coords.len() < 2 {
            return None;
        }
        Self::checked(coords[1].as_f64()?, coords[0].as_f64()?)
    }

    /// Parse `"lat,lng"`.
    pub fn parse_pair(s: &str) -> Option<Self> {
        let (lat, lng) = s.split_once(',')?;
        Self::checked(lat.trim().parse().ok()?, lng.trim().parse().ok()?)
    }

    /// Distance to `other` in meters.
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        haversine_m(self, other)
    }

    fn checked(lat: f64, lng: f64) -> Option<Self> {
        (lat.is_finite() && lng.is_finite()).then_some(Self { lat, lng })
    }
}

/// Great-circle distance between two points, in meters.
pub fn haversine_m(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}
