//! Vendor discovery command.

use anyhow::{Context, bail};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use keliling_client::transport::{HttpTransport, VendorDirectory};
use keliling_client::{VendorFilter, discovery::DEFAULT_RADIUS_KM};
use keliling_entity::location::GeoPoint;

use crate::output::{self, OutputFormat};

/// Arguments for the vendors command
#[derive(Debug, Args)]
pub struct VendorsArgs {
    /// Your location as `lat,lng`; restricts results to `--radius`
    #[arg(long)]
    pub near: Option<String>,
    /// Radius in kilometres
    #[arg(long, default_value_t = DEFAULT_RADIUS_KM)]
    pub radius: f64,
    /// Case-insensitive text matched against name and description
    #[arg(short, long)]
    pub query: Option<String>,
}

/// Vendor display row for table output
#[derive(Debug, Serialize, Tabled)]
struct VendorRow {
    /// Vendor ID
    id: String,
    /// Name
    name: String,
    /// Presence
    status: String,
    /// Distance
    distance: String,
    /// Coordinates
    location: String,
}

/// List vendors through the public API and filter them locally
pub async fn execute(args: &VendorsArgs, server: &str, format: OutputFormat) -> anyhow::Result<()> {
    let mut filter = VendorFilter::new();
    if let Some(query) = &args.query {
        filter = filter.query(query);
    }
    if let Some(near) = &args.near {
        let Some(point) = GeoPoint::parse_pair(near) else {
            bail!("--near must be 'lat,lng', got '{near}'");
        };
        filter = filter.near(point).within(args.radius);
    }

    let transport = HttpTransport::new(super::anonymous_session(server))?;
    let vendors = transport
        .list_vendors()
        .await
        .context("Failed to list vendors")?;

    let rows: Vec<VendorRow> = filter
        .apply(&vendors)
        .into_iter()
        .map(|found| VendorRow {
            id: found.vendor.id.to_string(),
            name: found.vendor.name,
            status: if found.vendor.online { "online" } else { "offline" }.to_string(),
            distance: found
                .distance_m
                .map(|d| format!("{:.2} km", d / 1000.0))
                .unwrap_or_else(|| "-".to_string()),
            location: format!("{:.5},{:.5}", found.point.lat, found.point.lng),
        })
        .collect();

    output::print_list(&rows, format);
    Ok(())
}
