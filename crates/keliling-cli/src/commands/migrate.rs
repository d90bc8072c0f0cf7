//! Database migration command.

use anyhow::Context;

use keliling_database::DatabasePool;
use keliling_database::migration::run_migrations;

use crate::output;

/// Apply all pending migrations to the configured database
pub async fn execute(env: &str) -> anyhow::Result<()> {
    let config = super::load_config(env)?;
    let pool = DatabasePool::connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    println!("Running database migrations...");
    let result = run_migrations(pool.pool()).await;
    pool.close().await;
    result.context("Migration failed")?;

    output::print_success("All migrations applied successfully.");
    Ok(())
}
