//! # CuidaMe DB
//!
//! PostgreSQL connection pool and embedded migrations.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DB_MAX_CONNECTIONS`: pool size (default: 10)
//!
//! # Example
//!
//! ```ignore
//! use cuidame_db::{DatabaseConfig, init_db_pool, run_migrations};
//!
//! let config = DatabaseConfig::from_env()?;
//! let pool = init_db_pool(&config).await?;
//! run_migrations(&pool).await?;
//! ```

use std::env;
use std::time::Duration;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;

pub use sqlx::PgPool;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

#[derive(Debug, thiserror::Error)]
#[error("DATABASE_URL must be set")]
pub struct MissingDatabaseUrl;

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, MissingDatabaseUrl> {
        let url = env::var("DATABASE_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .ok_or(MissingDatabaseUrl)?;

        Ok(Self {
            url,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            acquire_timeout: Duration::from_secs(5),
        })
    }
}

/// Opens the connection pool. Fails if the database is unreachable.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.url)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        "Database pool initialized"
    );

    Ok(pool)
}

/// Applies pending migrations from `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
