//! Change feed streaming command.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use clap::Args;

use keliling_client::FeedBridge;
use keliling_core::events::{RowChange, VENDORS_TOPIC};
use keliling_core::traits::{ChangeFeed, ChangeHandler};
use keliling_realtime::MemoryChangeFeed;

use crate::output;

/// Arguments for the watch command
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Access token
    #[arg(long, env = "KELILING_TOKEN")]
    pub token: String,
    /// Topic: `vendors` or `vendors:{id}`
    #[arg(long, default_value = VENDORS_TOPIC)]
    pub topic: String,
}

/// Prints each change as one JSON line.
struct PrintChange;

#[async_trait]
impl ChangeHandler for PrintChange {
    async fn on_change(&self, change: RowChange) {
        match serde_json::to_string(&change) {
            Ok(line) => println!("{line}"),
            Err(e) => output::print_error(&format!("Unprintable change: {e}")),
        }
    }
}

/// Stream changes until the server closes the connection or Ctrl+C
pub async fn execute(args: &WatchArgs, env: &str, server: &str) -> anyhow::Result<()> {
    let session = super::session_for(env, server, &args.token)?;

    let feed = Arc::new(MemoryChangeFeed::default());
    feed.subscribe(&args.topic, Arc::new(PrintChange)).await?;

    let mut bridge = FeedBridge::connect(&session, &[&args.topic], feed)
        .await
        .context("Failed to connect to change feed")?;
    output::print_success(&format!("Watching '{}' (Ctrl+C to stop)", args.topic));

    tokio::select! {
        _ = bridge.closed() => output::print_warning("Server closed the connection."),
        _ = tokio::signal::ctrl_c() => {}
    }
    Ok(())
}
