mod error;
mod models;
mod pagination;
pub mod repositories;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

use crate::config::DatabaseConfig;

pub use error::{DatabaseError, DbResult};
pub use models::*;
pub use pagination::{Page, PageQuery, PageRequest};

/// Open the connection pool and bring the schema up to date.
pub async fn init_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)
        .with_context(|| format!("Invalid DATABASE_URL: {}", config.url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(config.max_connections.unwrap_or(10))
        .min_connections(config.min_connections.unwrap_or(1));

    // Every connection to `:memory:` is its own database; pin a single one.
    if config.is_in_memory() {
        pool_options = pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = pool_options
        .connect_with(options)
        .await
        .context("Failed to connect to the database")?;

    run_migrations(&pool).await?;
    info!(url = %config.url, "Database ready");

    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(DatabaseError::from)
        .context("Failed to run migrations")?;
    Ok(())
}
