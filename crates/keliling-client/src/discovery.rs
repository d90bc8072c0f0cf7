//! Map-side discovery filtering.

use keliling_entity::location::GeoPoint;
use keliling_entity::vendor::VendorSummary;

/// Radius used when none is given.
pub const DEFAULT_RADIUS_KM: f64 = 2.5;

/// A vendor that passed the filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Discovered {
    pub vendor: VendorSummary,
    pub point: GeoPoint,
    /// Metres from the user, when their location is known.
    pub distance_m: Option<f64>,
}

/// Text and radius filter over the vendor list.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorFilter {
    /// Lowercased, trimmed search text. Empty matches everything.
    query: String,
    /// The user's location.
    pub near: Option<GeoPoint>,
    pub radius_km: f64,
    /// Keep only vendors within `radius_km` of `near`.
    pub within_radius: bool,
}

impl Default for VendorFilter {
    fn default() -> Self {
        Self {
            query: String::new(),
            near: None,
            radius_km: DEFAULT_RADIUS_KM,
            within_radius: false,
        }
    }
}

impl VendorFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: &str) -> Self {
        self.query = query.trim().to_lowercase();
        self
    }

    pub fn near(mut self, point: GeoPoint) -> Self {
        self.near = Some(point);
        self
    }

    /// Restricts results to `radius_km` around the user.
    pub fn within(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self.within_radius = true;
        self
    }

    /// Whether `vendor` passes, with its point and distance if so.
    pub fn check(&self, vendor: &VendorSummary) -> Option<Discovered> {
        let point = vendor.geo_point()?;

        if !self.query.is_empty() && !vendor.search_text().to_lowercase().contains(&self.query) {
            return None;
        }

        let distance_m = self.near.map(|user| user.distance_m(&point));
        if self.within_radius {
            // Radius filtering needs the user's location.
            let d = distance_m?;
            if d > self.radius_km * 1000.0 {
                return None;
            }
        }

        Some(Discovered {
            vendor: vendor.clone(),
            point,
            distance_m,
        })
    }

    /// Filters `vendors`, nearest first when the user's location is known.
    pub fn apply(&self, vendors: &[VendorSummary]) -> Vec<Discovered> {
        let mut found: Vec<Discovered> = vendors.iter().filter_map(|v| self.check(v)).collect();
        if self.near.is_some() {
            found.sort_by(|a, b| {
                a.distance_m
                    .unwrap_or(f64::MAX)
                    .total_cmp(&b.distance_m.unwrap_or(f64::MAX))
            });
        }
        found
    }
}
