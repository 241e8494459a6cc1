//! SQLite implementation of IVersionCursor
//!
//! The composite watermark lives in the single row of `sync_versions`.
//! Updates run read-transform-write inside one transaction, and an async
//! mutex serializes concurrent updaters within the process so two
//! collections advancing at the same time never lose each other's write.

use sqlx::{Row, SqlitePool};
use tokio::sync::Mutex;

use matchday_core::domain::SyncVersions;
use matchday_core::ports::{IVersionCursor, VersionTransform};

use crate::CacheError;

/// SQLite-backed composite version watermark
pub struct SqliteVersionCursor {
    pool: SqlitePool,
    write_lock: Mutex<()>,
}

impl SqliteVersionCursor {
    /// Creates a new cursor with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Mutex::new(()),
        }
    }

    /// Resets every watermark to zero, forcing a first sync
    pub async fn reset(&self) -> Result<(), CacheError> {
        let _guard = self.write_lock.lock().await;
        sqlx::query("UPDATE sync_versions SET news = 0, transfers = 0 WHERE id = 1")
            .execute(&self.pool)
            .await?;
        tracing::info!("Version cursor reset");
        Ok(())
    }
}

fn versions_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<SyncVersions, CacheError> {
    let news: i64 = row.try_get("news")?;
    let transfers: i64 = row.try_get("transfers")?;
    Ok(SyncVersions {
        news: u64::try_from(news)
            .map_err(|_| CacheError::SerializationError(format!("Negative news version {news}")))?,
        transfers: u64::try_from(transfers).map_err(|_| {
            CacheError::SerializationError(format!("Negative transfers version {transfers}"))
        })?,
    })
}

fn to_sql_version(version: u64) -> Result<i64, CacheError> {
    i64::try_from(version)
        .map_err(|_| CacheError::SerializationError(format!("Version {version} out of range")))
}

#[async_trait::async_trait]
impl IVersionCursor for SqliteVersionCursor {
    async fn read(&self) -> anyhow::Result<SyncVersions> {
        let row = sqlx::query("SELECT news, transfers FROM sync_versions WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(versions_from_row(&row)?)
    }

    async fn update(&self, transform: VersionTransform) -> anyhow::Result<SyncVersions> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT news, transfers FROM sync_versions WHERE id = 1")
            .fetch_one(&mut *tx)
            .await?;
        let current = versions_from_row(&row)?;
        let next = transform(current);

        sqlx::query("UPDATE sync_versions SET news = ?, transfers = ? WHERE id = 1")
            .bind(to_sql_version(next.news)?)
            .bind(to_sql_version(next.transfers)?)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::debug!(
            news = next.news,
            transfers = next.transfers,
            "Version cursor updated"
        );
        Ok(next)
    }
}
