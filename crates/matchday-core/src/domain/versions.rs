//! Composite version cursor
//!
//! [`SyncVersions`] is an immutable snapshot holding the last-synced version
//! of every collection. It is only ever advanced through a pure transform
//! handed to `IVersionCursor::update`, never written field by field.

use serde::{Deserialize, Serialize};

use super::collection::Collection;

/// Last-synced version watermark per collection
///
/// `0` means the collection has never been synced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncVersions {
    /// Version watermark for news articles
    pub news: u64,
    /// Version watermark for transfer listings
    pub transfers: u64,
}

impl SyncVersions {
    /// Reads the watermark of one collection
    pub fn version(&self, collection: Collection) -> u64 {
        match collection {
            Collection::News => self.news,
            Collection::Transfers => self.transfers,
        }
    }

    /// Returns a new snapshot with `collection` advanced to `version`
    ///
    /// The watermark never moves backwards: a lower `version` leaves the
    /// snapshot unchanged.
    #[must_use]
    pub fn with_version(self, collection: Collection, version: u64) -> Self {
        let mut next = self;
        match collection {
            Collection::News => next.news = next.news.max(version),
            Collection::Transfers => next.transfers = next.transfers.max(version),
        }
        next
    }

    /// Returns true if `collection` has never completed a sync pass
    pub fn is_first_sync(&self, collection: Collection) -> bool {
        self.version(collection) == 0
    }
}
