//! SQLite implementation of IViewedStateStore and IPushTopics
//!
//! Per-user state that is not part of the synced dataset: which items were
//! viewed or bookmarked, whether "new items" notifications are enabled per
//! collection, and which push topics were subscribed.
//!
//! Notification preferences fall back to enabled when no row exists;
//! [`SqliteReadingState::seed_notification_defaults`] writes configured
//! defaults without overriding choices the user already made.

use std::collections::HashSet;

use chrono::Utc;
use sqlx::SqlitePool;

use matchday_core::config::NotificationsConfig;
use matchday_core::domain::Collection;
use matchday_core::ports::{IPushTopics, IViewedStateStore};

use crate::CacheError;

/// SQLite-backed reading state and push topic registry
pub struct SqliteReadingState {
    pool: SqlitePool,
}

impl SqliteReadingState {
    /// Creates a new instance with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Stores configured notification defaults for collections without a preference
    pub async fn seed_notification_defaults(
        &self,
        defaults: &NotificationsConfig,
    ) -> Result<(), CacheError> {
        for collection in Collection::ALL {
            sqlx::query(
                "INSERT INTO notification_prefs (collection, enabled) VALUES (?, ?) \
                 ON CONFLICT(collection) DO NOTHING",
            )
            .bind(collection.key())
            .bind(defaults.enabled_for(collection))
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    /// Topics recorded as subscribed, in subscription order
    pub async fn subscribed_topics(&self) -> Result<Vec<String>, CacheError> {
        let topics = sqlx::query_scalar("SELECT topic FROM push_topics ORDER BY subscribed_at, topic")
            .fetch_all(&self.pool)
            .await?;
        Ok(topics)
    }

    async fn ids_in(&self, table: &str, collection: Collection) -> Result<HashSet<String>, CacheError> {
        let sql = format!("SELECT entity_id FROM {table} WHERE collection = ?");
        let ids: Vec<String> = sqlx::query_scalar(&sql)
            .bind(collection.key())
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().collect())
    }
}

#[async_trait::async_trait]
impl IViewedStateStore for SqliteReadingState {
    async fn set_viewed(
        &self,
        collection: Collection,
        ids: &[String],
        viewed: bool,
    ) -> anyhow::Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;
        for id in ids {
            if viewed {
                sqlx::query(
                    "INSERT INTO viewed_items (collection, entity_id, viewed_at) VALUES (?, ?, ?) \
                     ON CONFLICT(collection, entity_id) DO NOTHING",
                )
                .bind(collection.key())
                .bind(id.as_str())
                .bind(&now)
                .execute(&mut *tx)
                .await?;
            } else {
                sqlx::query("DELETE FROM viewed_items WHERE collection = ? AND entity_id = ?")
                    .bind(collection.key())
                    .bind(id.as_str())
                    .execute(&mut *tx)
                    .await?;
            }
        }
        tx.commit().await?;

        tracing::trace!(collection = %collection, count = ids.len(), viewed, "Updated viewed state");
        Ok(())
    }

    async fn is_viewed(&self, collection: Collection, id: &str) -> anyhow::Result<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM viewed_items WHERE collection = ? AND entity_id = ?",
        )
        .bind(collection.key())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found.is_some())
    }

    async fn viewed_ids(&self, collection: Collection) -> anyhow::Result<HashSet<String>> {
        Ok(self.ids_in("viewed_items", collection).await?)
    }

    async fn toggle_bookmark(&self, collection: Collection, id: &str) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query("DELETE FROM bookmarks WHERE collection = ? AND entity_id = ?")
            .bind(collection.key())
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let bookmarked = if removed > 0 {
            false
        } else {
            sqlx::query("INSERT INTO bookmarks (collection, entity_id, created_at) VALUES (?, ?, ?)")
                .bind(collection.key())
                .bind(id)
                .bind(Utc::now().to_rfc3339())
                .execute(&mut *tx)
                .await?;
            true
        };
        tx.commit().await?;

        Ok(bookmarked)
    }

    async fn bookmarked_ids(&self, collection: Collection) -> anyhow::Result<HashSet<String>> {
        Ok(self.ids_in("bookmarks", collection).await?)
    }

    async fn is_notification_enabled(&self, collection: Collection) -> anyhow::Result<bool> {
        let enabled: Option<bool> =
            sqlx::query_scalar("SELECT enabled FROM notification_prefs WHERE collection = ?")
                .bind(collection.key())
                .fetch_optional(&self.pool)
                .await?;
        Ok(enabled.unwrap_or(true))
    }

    async fn set_notification_enabled(
        &self,
        collection: Collection,
        enabled: bool,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO notification_prefs (collection, enabled) VALUES (?, ?) \
             ON CONFLICT(collection) DO UPDATE SET enabled = excluded.enabled",
        )
        .bind(collection.key())
        .bind(enabled)
        .execute(&self.pool)
        .await?;

        tracing::info!(collection = %collection, enabled, "Notification preference changed");
        Ok(())
    }
}

#[async_trait::async_trait]
impl IPushTopics for SqliteReadingState {
    async fn subscribe(&self, topic: &str) -> anyhow::Result<()> {
        let result = sqlx::query(
            "INSERT INTO push_topics (topic, subscribed_at) VALUES (?, ?) \
             ON CONFLICT(topic) DO NOTHING",
        )
        .bind(topic)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            tracing::info!(topic, "Subscribed to push topic");
        }
        Ok(())
    }
}
