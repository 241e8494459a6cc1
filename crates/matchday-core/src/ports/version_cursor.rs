//! Version cursor port (driven/secondary port)
//!
//! Persists the composite [`SyncVersions`] watermark. The only way to change
//! it is [`IVersionCursor::update`], which must run read, transform and write
//! as one atomic step so concurrent passes never lose an update.

use crate::domain::SyncVersions;

/// Pure transform from the current snapshot to the next one
pub type VersionTransform = Box<dyn FnOnce(SyncVersions) -> SyncVersions + Send>;

/// Port trait for the persisted version watermark
#[async_trait::async_trait]
pub trait IVersionCursor: Send + Sync {
    /// Reads the current snapshot (all zeros if never written)
    async fn read(&self) -> anyhow::Result<SyncVersions>;

    /// Atomically applies `transform` and returns the stored result
    async fn update(&self, transform: VersionTransform) -> anyhow::Result<SyncVersions>;
}
