use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates the PostgreSQL pool backing the assignment ledger.
/// Waiting for a connection is bounded by the ledger timeout.
pub async fn create_ledger_pool(database_url: &str, acquire_timeout: Duration) -> Result<PgPool> {
    info!("Connecting to PostgreSQL ledger...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await
        .context("Failed to connect to the PostgreSQL ledger")?;

    info!("PostgreSQL ledger pool established");
    Ok(pool)
}
