//! Matchday Cache - Local dataset persistence
//!
//! SQLite-based storage for:
//! - News articles and transfer listings
//! - The composite version watermark
//! - Viewed items, bookmarks and notification preferences
//! - Push topic subscriptions
//! - The full-text search index
//!
//! ## Architecture
//!
//! This crate implements the storage ports from `matchday-core` using SQLite
//! as the backend. It is a driven (secondary) adapter in the hexagonal
//! architecture.
//!
//! ## Key Components
//!
//! - [`DatabasePool`] - Connection pool with migration support
//! - [`SqliteEntityStore`] - `ILocalStore` for one entity collection
//! - [`SqliteVersionCursor`] - `IVersionCursor` with serialized transactional updates
//! - [`SqliteReadingState`] - `IViewedStateStore` and `IPushTopics`
//! - [`SqliteSearchIndex`] - `ISearchIndex` over an FTS5 table
//! - [`CacheError`] - Error types for cache operations
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use matchday_cache::{DatabasePool, SqliteEntityStore};
//! use matchday_core::domain::NewsArticle;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = DatabasePool::new(Path::new("/home/user/.local/share/matchday/matchday.db")).await?;
//! let news = SqliteEntityStore::<NewsArticle>::new(pool.pool().clone());
//! // Use news as ILocalStore<NewsArticle>...
//! # Ok(())
//! # }
//! ```

pub mod entity_store;
pub mod pool;
pub mod reading_state;
pub mod search_index;
pub mod version_cursor;

pub use entity_store::SqliteEntityStore;
pub use pool::DatabasePool;
pub use reading_state::SqliteReadingState;
pub use search_index::{SearchHit, SqliteSearchIndex};
pub use version_cursor::SqliteVersionCursor;

/// Errors that can occur during cache operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Failed to establish a database connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Serialization or deserialization of domain types failed
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<sqlx::Error> for CacheError {
    fn from(e: sqlx::Error) -> Self {
        CacheError::QueryFailed(e.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::SerializationError(e.to_string())
    }
}

/// Largest number of ids bound into a single `IN (...)` clause
pub(crate) const MAX_BIND_IDS: usize = 500;

/// Builds `?, ?, ?` for `count` bind parameters
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
