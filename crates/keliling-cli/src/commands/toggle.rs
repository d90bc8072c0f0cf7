//! Optimistic presence toggle command.

use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::Args;
use uuid::Uuid;

use keliling_client::transport::HttpTransport;
use keliling_client::{ListRefresher, PresenceToggle, ToggleOutcome, TracingNotifier, VendorListView};
use keliling_core::types::VendorId;

use crate::output;

/// Arguments for the toggle command
#[derive(Debug, Args)]
pub struct ToggleArgs {
    /// Vendor to toggle; must be owned by the token's user
    #[arg(long)]
    pub vendor: Uuid,
    /// Access token
    #[arg(long, env = "KELILING_TOKEN")]
    pub token: String,
}

/// Read the vendor's current presence, flip it, and report the outcome
pub async fn execute(args: &ToggleArgs, env: &str, server: &str) -> anyhow::Result<()> {
    let vendor_id = VendorId::from_uuid(args.vendor);
    let session = Arc::new(super::session_for(env, server, &args.token)?.with_owned_vendor(vendor_id));

    let transport = Arc::new(HttpTransport::new(session.clone())?);
    let view = Arc::new(VendorListView::new());
    ListRefresher::new(transport.clone(), view.clone())
        .reload()
        .await
        .context("Failed to read current presence")?;

    let current = view
        .online(vendor_id)
        .await
        .ok_or_else(|| anyhow!("Vendor {vendor_id} not found"))?;

    let toggle = PresenceToggle::new(session, transport, view, Arc::new(TracingNotifier));
    match toggle.toggle(vendor_id, current).await? {
        ToggleOutcome::Confirmed { online } => {
            output::print_success(&format!(
                "Vendor is now {}",
                if online { "online" } else { "offline" }
            ));
            Ok(())
        }
        ToggleOutcome::Reverted { online, error } => {
            output::print_warning(&format!(
                "Update failed, still {}",
                if online { "online" } else { "offline" }
            ));
            Err(error.into())
        }
        ToggleOutcome::Superseded => {
            output::print_warning("A newer toggle superseded this one.");
            Ok(())
        }
    }
}
