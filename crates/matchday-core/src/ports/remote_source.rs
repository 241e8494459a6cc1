//! Remote change source port (driven/secondary port)
//!
//! This module defines the interface to the remote source of truth. The
//! remote reports changes as version-stamped [`ChangeRecord`]s and serves
//! full entity payloads by id.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are adapter-specific.
//! - Payloads are returned as raw JSON values; the sync engine decodes them
//!   into the collection's entity type, so one port serves every collection.
//! - Both calls must be safe to retry: the engine re-issues them on the next
//!   pass after any failure.

use crate::domain::{ChangeRecord, Collection};

/// Raw entity payload as served by the remote source
pub type EntityPayload = serde_json::Value;

/// Port trait for the remote source of truth
#[async_trait::async_trait]
pub trait IRemoteChangeSource: Send + Sync {
    /// Lists changes recorded after `after_version`
    ///
    /// `None` requests the complete change history (first sync).
    async fn fetch_changes_since(
        &self,
        collection: Collection,
        after_version: Option<u64>,
    ) -> anyhow::Result<Vec<ChangeRecord>>;

    /// Fetches full payloads for the given ids
    ///
    /// Ids unknown to the remote are omitted from the result.
    async fn fetch_entities_by_ids(
        &self,
        collection: Collection,
        ids: &[String],
    ) -> anyhow::Result<Vec<EntityPayload>>;
}
