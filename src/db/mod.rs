//! Database module for DevDigest.
//!
//! This module provides sqlx pool management and migration handling.
//! SQLite is the default backend; PostgreSQL is available behind the
//! `postgres` feature.

mod schema;

pub use schema::MIGRATIONS;

use tracing::{debug, info};

use crate::{DigestError, Result};

/// Connection pool for the configured backend.
#[cfg(feature = "sqlite")]
pub type DbPool = sqlx::SqlitePool;
/// Connection pool for the configured backend.
#[cfg(feature = "postgres")]
pub type DbPool = sqlx::PgPool;

/// Database backend marker, used with `sqlx::QueryBuilder`.
#[cfg(feature = "sqlite")]
pub type DbBackend = sqlx::Sqlite;
/// Database backend marker, used with `sqlx::QueryBuilder`.
#[cfg(feature = "postgres")]
pub type DbBackend = sqlx::Postgres;

/// Database wrapper owning the connection pool.
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Connect to the database at the given URL and apply migrations.
    ///
    /// For SQLite the database file is created if it doesn't exist.
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Opening database at {}", url);
        let pool = Self::create_pool(url).await?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Open an in-memory database for testing.
    #[cfg(feature = "sqlite")]
    pub async fn open_in_memory() -> Result<Self> {
        debug!("Opening in-memory database");
        // A single connection keeps every query on the same in-memory database.
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| DigestError::DatabaseConnection(e.to_string()))?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    #[cfg(feature = "sqlite")]
    async fn create_pool(url: &str) -> Result<DbPool> {
        use std::str::FromStr;

        use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

        if let Some(path) = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
        {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| DigestError::DatabaseConnection(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5));

        SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| DigestError::DatabaseConnection(e.to_string()))
    }

    #[cfg(feature = "postgres")]
    async fn create_pool(url: &str) -> Result<DbPool> {
        sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| DigestError::DatabaseConnection(e.to_string()))
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Get the current schema version.
    pub async fn schema_version(&self) -> Result<i64> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version    BIGINT PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        let version: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
                .fetch_one(&self.pool)
                .await?;
        Ok(version)
    }

    /// Apply pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        let current_version = self.schema_version().await?;

        for (index, migration) in MIGRATIONS.iter().enumerate() {
            let version = index as i64 + 1;
            if version <= current_version {
                continue;
            }

            info!("Applying migration v{}", version);
            let mut tx = self.pool.begin().await?;
            for statement in migration.split(';').map(str::trim).filter(|s| !s.is_empty()) {
                sqlx::query(statement).execute(&mut *tx).await?;
            }
            sqlx::query("INSERT INTO schema_version (version, applied_at) VALUES ($1, $2)")
                .bind(version)
                .bind(crate::datetime::to_db_string(&chrono::Utc::now()))
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
        }

        Ok(())
    }

    /// Check that the articles table is reachable.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT id FROM articles LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DigestError::DatabaseConnection(e.to_string()))?;
        Ok(())
    }
}
