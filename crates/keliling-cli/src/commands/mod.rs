//! CLI command definitions and dispatch.

pub mod migrate;
pub mod toggle;
pub mod token;
pub mod vendors;
pub mod watch;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use keliling_auth::JwtDecoder;
use keliling_client::Session;
use keliling_core::config::AppConfig;

use crate::output::OutputFormat;

/// Keliling vendor presence service
#[derive(Debug, Parser)]
#[command(name = "keliling", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (`config/{env}.toml`)
    #[arg(short, long, env = "KELILING_ENV", default_value = "development")]
    pub env: String,

    /// Server origin for client commands
    #[arg(short, long, default_value = "http://localhost:4000")]
    pub server: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run pending database migrations
    Migrate,
    /// Mint a development access token
    Token(token::TokenArgs),
    /// List vendors, optionally filtered by text and distance
    Vendors(vendors::VendorsArgs),
    /// Toggle a vendor's presence optimistically
    Toggle(toggle::ToggleArgs),
    /// Stream vendor change notifications
    Watch(watch::WatchArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> anyhow::Result<()> {
        match &self.command {
            Commands::Migrate => migrate::execute(&self.env).await,
            Commands::Token(args) => token::execute(args, &self.env),
            Commands::Vendors(args) => vendors::execute(args, &self.server, self.format).await,
            Commands::Toggle(args) => toggle::execute(args, &self.env, &self.server).await,
            Commands::Watch(args) => watch::execute(args, &self.env, &self.server).await,
        }
    }
}

/// Helper: load configuration for `env`
pub fn load_config(env: &str) -> anyhow::Result<AppConfig> {
    AppConfig::load(env).with_context(|| format!("Failed to load config for '{env}'"))
}

/// Helper: build a session for `token`, verified with the configured secret
pub fn session_for(env: &str, server: &str, token: &str) -> anyhow::Result<Session> {
    let config = load_config(env)?;
    let claims = JwtDecoder::new(&config.auth)
        .decode_access_token(token)
        .context("Access token rejected")?;
    Ok(Session::new(server, token, claims.into()))
}

/// Helper: a session with no credential, for public reads
pub fn anonymous_session(server: &str) -> Arc<Session> {
    Arc::new(Session::new(
        server,
        "",
        keliling_core::types::Principal::new(keliling_core::types::UserId::default()),
    ))
}
