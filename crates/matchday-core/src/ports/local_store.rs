//! Local entity store port (driven/secondary port)
//!
//! Per-collection persistence of synchronised entities. One implementation
//! instance serves one entity type.
//!
//! ## Implementation Notes
//!
//! - `upsert_many` merges by id: new values replace old ones for the same id,
//!   unrelated rows are untouched. A call should be applied atomically.
//! - `delete_many` ignores ids that are not present.

use std::collections::HashSet;

use crate::domain::Entity;

/// Port trait for local persistence of one entity collection
#[async_trait::async_trait]
pub trait ILocalStore<E: Entity>: Send + Sync {
    /// Inserts or replaces the given entities
    async fn upsert_many(&self, entities: &[E]) -> anyhow::Result<()>;

    /// Deletes the given ids
    async fn delete_many(&self, ids: &[String]) -> anyhow::Result<()>;

    /// Returns the subset of `candidate_ids` currently stored
    async fn existing_ids(&self, candidate_ids: &HashSet<String>)
        -> anyhow::Result<HashSet<String>>;

    /// Reads the stored entities for the given ids
    async fn read_by_ids(&self, ids: &HashSet<String>) -> anyhow::Result<Vec<E>>;

    /// Returns every stored id
    async fn all_ids(&self) -> anyhow::Result<HashSet<String>>;

    /// Number of stored entities
    async fn count(&self) -> anyhow::Result<u64>;
}
