//! Remote change records and their partitioning
//!
//! The remote source reports mutations as a flat list of [`ChangeRecord`]s.
//! A [`ChangeSet`] splits that list into the ids to delete and the ids to
//! (re)fetch and upsert, which is the shape the sync engine works with.
//!
//! ## Conflicting records
//!
//! If the same id is reported both as deleted and as updated within one
//! list, the delete wins: the id only appears in [`ChangeSet::to_delete`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// One remote mutation event for an entity id
///
/// `version` is the version at which that id last changed. Records within
/// a fetched list carry no ordering guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    /// Entity identifier
    pub id: String,
    /// Version at which the entity last changed
    pub version: u64,
    /// Whether the entity was deleted at that version
    #[serde(default)]
    pub is_delete: bool,
}

impl ChangeRecord {
    /// Creates an upsert record
    pub fn upsert(id: impl Into<String>, version: u64) -> Self {
        Self {
            id: id.into(),
            version,
            is_delete: false,
        }
    }

    /// Creates a delete record
    pub fn delete(id: impl Into<String>, version: u64) -> Self {
        Self {
            id: id.into(),
            version,
            is_delete: true,
        }
    }

    /// Rejects records with an empty id
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id.trim().is_empty() {
            return Err(DomainError::EmptyId);
        }
        Ok(())
    }
}

/// A change list partitioned into deletes and updates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    to_delete: Vec<String>,
    to_update: Vec<String>,
    latest_version: Option<u64>,
}

impl ChangeSet {
    /// Partitions a change list
    ///
    /// Ids are deduplicated, keeping first-seen order. An id with any
    /// delete record is removed from the update side.
    pub fn from_records(records: &[ChangeRecord]) -> Self {
        let mut delete_seen = HashSet::new();
        let mut to_delete = Vec::new();
        for record in records.iter().filter(|r| r.is_delete) {
            if delete_seen.insert(record.id.as_str()) {
                to_delete.push(record.id.clone());
            }
        }

        let mut update_seen = HashSet::new();
        let mut to_update = Vec::new();
        for record in records.iter().filter(|r| !r.is_delete) {
            if delete_seen.contains(record.id.as_str()) {
                continue;
            }
            if update_seen.insert(record.id.as_str()) {
                to_update.push(record.id.clone());
            }
        }

        Self {
            to_delete,
            to_update,
            latest_version: records.iter().map(|r| r.version).max(),
        }
    }

    /// Ids removed on the remote side
    pub fn to_delete(&self) -> &[String] {
        &self.to_delete
    }

    /// Ids created or changed on the remote side
    pub fn to_update(&self) -> &[String] {
        &self.to_update
    }

    /// Highest version observed in the list, `None` for an empty list
    pub fn latest_version(&self) -> Option<u64> {
        self.latest_version
    }

    /// Returns true if the list contained no records at all
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_update.is_empty()
    }
}
