//! Startup vendor seed.

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Vendors written into an empty store at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub vendors: Vec<SeedVendor>,
}

/// One `[[seed.vendors]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedVendor {
    pub owner_id: UserId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub online: bool,
}

impl SeedVendor {
    /// `{ "lat", "lng" }` when both coordinates are set.
    pub fn location(&self) -> Option<serde_json::Value> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(serde_json::json!({ "lat": lat, "lng": lng })),
            _ => None,
        }
    }
}
