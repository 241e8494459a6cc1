//! Data-changed signal port (driven/secondary port)
//!
//! Raised by the sync engine whenever a pass deleted or upserted rows of a
//! collection, so downstream consumers (cached queries, the search index)
//! can invalidate. It fires even when notifications are suppressed.

use crate::domain::Collection;

/// Port trait for broadcasting "collection data changed"
#[async_trait::async_trait]
pub trait IChangeDataSignal: Send + Sync {
    /// Signals that the local rows of `collection` changed
    async fn notify_data_changed(&self, collection: Collection);
}
