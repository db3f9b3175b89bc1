//! # Schoolhouse DB
//!
//! PostgreSQL pool setup, embedded migrations and helpers for classifying
//! constraint violations.
//!
//! ```ignore
//! use schoolhouse_config::DatabaseConfig;
//!
//! let pool = schoolhouse_db::init_db_pool(&DatabaseConfig::from_env()?).await?;
//! schoolhouse_db::run_migrations(&pool).await?;
//! ```

pub mod constraints;

use anyhow::Context;
use schoolhouse_config::DatabaseConfig;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

pub use constraints::{is_foreign_key_violation, unique_violation};
pub use sqlx::PgPool;

/// Migrations under `/migrations`, compiled into the binary.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn init_db_pool(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .context("Failed to connect to database")?;

    info!(max_connections = config.max_connections, "Database pool ready");
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations applied");
    Ok(())
}
