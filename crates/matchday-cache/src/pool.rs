//! SQLite pool for the local dataset
//!
//! ## Design Notes
//!
//! - File databases run WAL with `synchronous = NORMAL`: one fsync per
//!   checkpoint rather than per batch commit. A lost tail commit is
//!   re-applied by the next pass since the watermark is written last.
//! - Migrations in `src/migrations` are embedded with `sqlx::migrate!` and
//!   tracked in `_sqlx_migrations`.
//! - `in_memory()` pins a single connection: every SQLite memory database
//!   is private to its connection.

use std::path::Path;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

use matchday_core::config::StorageConfig;

use crate::CacheError;

static MIGRATOR: Migrator = sqlx::migrate!("src/migrations");

/// Readers plus one writer per collection
const MAX_CONNECTIONS: u32 = 4;

/// How long a writer waits on a locked database
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection pool over the Matchday database
pub struct DatabasePool {
    pool: SqlitePool,
}

impl DatabasePool {
    /// Opens the database configured in the `storage` section
    pub async fn from_config(config: &StorageConfig) -> Result<Self, CacheError> {
        Self::new(&config.database).await
    }

    /// Opens (creating if needed) the database file at `db_path` and migrates it
    ///
    /// # Errors
    ///
    /// `CacheError::ConnectionFailed` if the directory or file cannot be
    /// opened, `CacheError::MigrationFailed` if the schema cannot be applied.
    pub async fn new(db_path: &Path) -> Result<Self, CacheError> {
        if let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| {
                CacheError::ConnectionFailed(format!("{}: {e}", dir.display()))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(|e| CacheError::ConnectionFailed(format!("{}: {e}", db_path.display())))?;

        migrate(&pool).await?;
        tracing::info!(path = %db_path.display(), "Database opened");

        Ok(Self { pool })
    }

    /// Opens a private in-memory database (tests)
    pub async fn in_memory() -> Result<Self, CacheError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| CacheError::ConnectionFailed(format!("in-memory database: {e}")))?;

        migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// The underlying sqlx pool, cloned into each adapter
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn migrate(pool: &SqlitePool) -> Result<(), CacheError> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| CacheError::MigrationFailed(e.to_string()))?;
    tracing::debug!(migrations = MIGRATOR.iter().count(), "Schema up to date");
    Ok(())
}
