//! Postgres connection pool and schema bootstrap.

use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::instrument;

const SCHEMA: &str = include_str!("../migrations/0001_init.sql");

/// Open a connection pool against `database_url`.
#[instrument(skip(database_url), err)]
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

/// Create the tables if they do not exist yet. Safe to run on every start.
#[instrument(skip(pool), err)]
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    tracing::info!("database schema ensured");
    Ok(())
}
