//! Viewed-state store port (driven/secondary port)
//!
//! This module defines the interface for per-user reading state: which
//! entity ids have been viewed, which are bookmarked, and whether "new items"
//! notifications are enabled for a collection.
//!
//! ## Design Notes
//!
//! - State is keyed by `(collection, id)`; entities themselves carry no
//!   user state.
//! - `set_viewed` is a batch operation and must be applied atomically: the
//!   first sync seeds every fetched id in one call.

use std::collections::HashSet;

use crate::domain::Collection;

/// Port trait for user reading state and notification preferences
#[async_trait::async_trait]
pub trait IViewedStateStore: Send + Sync {
    /// Marks (or unmarks) the given ids as viewed
    async fn set_viewed(
        &self,
        collection: Collection,
        ids: &[String],
        viewed: bool,
    ) -> anyhow::Result<()>;

    /// Returns true if `id` has been viewed
    async fn is_viewed(&self, collection: Collection, id: &str) -> anyhow::Result<bool>;

    /// Returns every viewed id of `collection`
    async fn viewed_ids(&self, collection: Collection) -> anyhow::Result<HashSet<String>>;

    /// Flips the bookmark flag of `id` and returns the new state
    async fn toggle_bookmark(&self, collection: Collection, id: &str) -> anyhow::Result<bool>;

    /// Returns every bookmarked id of `collection`
    async fn bookmarked_ids(&self, collection: Collection) -> anyhow::Result<HashSet<String>>;

    /// Returns true if "new items" notifications are enabled for `collection`
    async fn is_notification_enabled(&self, collection: Collection) -> anyhow::Result<bool>;

    /// Enables or disables "new items" notifications for `collection`
    async fn set_notification_enabled(
        &self,
        collection: Collection,
        enabled: bool,
    ) -> anyhow::Result<()>;
}
