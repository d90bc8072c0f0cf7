//! Development token minting.

use anyhow::Context;
use clap::Args;
use uuid::Uuid;

use keliling_auth::JwtEncoder;
use keliling_core::types::UserId;

use crate::output;

/// Arguments for the token command
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// User ID to put in `sub`
    #[arg(long)]
    pub user: Uuid,
    /// Role claim
    #[arg(long, default_value = "authenticated")]
    pub role: String,
    /// Email claim
    #[arg(long)]
    pub email: Option<String>,
}

/// Print a signed access token for `--user`
pub fn execute(args: &TokenArgs, env: &str) -> anyhow::Result<()> {
    let config = super::load_config(env)?;
    let encoder = JwtEncoder::new(&config.auth);
    let (token, expires_at) = encoder
        .issue(
            UserId::from_uuid(args.user),
            Some(&args.role),
            args.email.as_deref(),
        )
        .context("Failed to sign token")?;

    println!("{token}");
    output::print_kv("user", &args.user.to_string());
    output::print_kv("expires", &expires_at.to_rfc3339());
    Ok(())
}
