//! Change-list synchronization engine
//!
//! The [`ChangeListSyncEngine`] reconciles one entity collection between the
//! remote source of truth and the local store, driven by the collection's
//! version watermark.
//!
//! ## Sync Pass
//!
//! 1. Read the watermark `v`; `v == 0` marks a first sync
//! 2. Fetch the change list recorded after `v`
//! 3. Delete the ids reported as deleted
//! 4. Look up which updated ids already exist locally (skipped on first sync)
//! 5. First sync only: mark every updated id as viewed
//! 6. Fetch payloads in batches of `batch_size`, upserting each batch as it arrives
//! 7. Signal "data changed" if anything was deleted or upserted
//! 8. Incremental sync only: notify about ids that did not exist before the pass
//! 9. Advance the watermark to the highest version in the change list
//!
//! Any failure in steps 2-7 aborts the pass and leaves the watermark where it
//! was. Upserts merge by id and deletes ignore missing ids, so the next pass
//! re-applies the same change list without harm. Batches completed before a
//! failure (or before cancellation) stay applied.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn, Instrument};

use matchday_core::config::{Config, DEFAULT_BATCH_SIZE};
use matchday_core::domain::{ChangeRecord, ChangeSet, Collection, Entity, SyncVersions};
use matchday_core::ports::{
    EntityPayload, IChangeDataSignal, ILocalStore, INotifier, IRemoteChangeSource,
    IVersionCursor, IViewedStateStore,
};

use crate::SyncError;

// ============================================================================
// SyncOptions
// ============================================================================

/// Tunables of a sync pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Ids fetched and upserted per batch; bounds peak memory of a pass
    pub batch_size: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl From<&Config> for SyncOptions {
    fn from(config: &Config) -> Self {
        Self {
            batch_size: config.sync.batch_size.max(1),
        }
    }
}

// ============================================================================
// SyncOutcome / SyncPassReport
// ============================================================================

/// Boolean result of one collection's sync pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Every step applied and the watermark advanced (or nothing changed)
    Succeeded,
    /// The pass aborted; the watermark is untouched
    Failed,
}

impl SyncOutcome {
    /// Returns true for [`SyncOutcome::Succeeded`]
    pub fn is_success(&self) -> bool {
        matches!(self, SyncOutcome::Succeeded)
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::Succeeded => write!(f, "succeeded"),
            SyncOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// Summary of a successful sync pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPassReport {
    /// Collection that was synced
    pub collection: Collection,
    /// Whether the watermark was unset before the pass
    pub first_sync: bool,
    /// Number of ids deleted locally
    pub deleted: usize,
    /// Number of entities upserted locally
    pub upserted: usize,
    /// Number of entities announced to the notifier
    pub notified: usize,
    /// Watermark after the pass, `None` if the change list was empty
    pub new_version: Option<u64>,
}

impl SyncPassReport {
    fn empty(collection: Collection, first_sync: bool) -> Self {
        Self {
            collection,
            first_sync,
            deleted: 0,
            upserted: 0,
            notified: 0,
            new_version: None,
        }
    }
}

// ============================================================================
// CollectionSync
// ============================================================================

/// A collection that can be synced on its own
///
/// Lets the orchestrator hold engines of different entity types side by side.
#[async_trait::async_trait]
pub trait CollectionSync: Send + Sync {
    /// Collection driven by this engine
    fn collection(&self) -> Collection;

    /// Runs one sync pass and reports whether it succeeded
    async fn sync_with(&self) -> SyncOutcome;
}

// ============================================================================
// ChangeListSyncEngine
// ============================================================================

/// Reconciliation engine for one entity collection
///
/// ## Dependencies
///
/// - `remote`: change lists and entity payloads
/// - `local_store`: the collection's local rows
/// - `version_cursor`: the composite watermark, advanced atomically
/// - `viewed_state`: viewed-set seeding and notification preferences
/// - `notifier`: "new items" notifications
/// - `change_signal`: "data changed" for downstream observers
pub struct ChangeListSyncEngine<E: Entity> {
    remote: Arc<dyn IRemoteChangeSource + Send + Sync>,
    local_store: Arc<dyn ILocalStore<E> + Send + Sync>,
    version_cursor: Arc<dyn IVersionCursor + Send + Sync>,
    viewed_state: Arc<dyn IViewedStateStore + Send + Sync>,
    notifier: Arc<dyn INotifier + Send + Sync>,
    change_signal: Arc<dyn IChangeDataSignal + Send + Sync>,
    options: SyncOptions,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> ChangeListSyncEngine<E> {
    /// Creates a new engine with the given collaborators
    pub fn new(
        remote: Arc<dyn IRemoteChangeSource + Send + Sync>,
        local_store: Arc<dyn ILocalStore<E> + Send + Sync>,
        version_cursor: Arc<dyn IVersionCursor + Send + Sync>,
        viewed_state: Arc<dyn IViewedStateStore + Send + Sync>,
        notifier: Arc<dyn INotifier + Send + Sync>,
        change_signal: Arc<dyn IChangeDataSignal + Send + Sync>,
        options: SyncOptions,
    ) -> Self {
        Self {
            remote,
            local_store,
            version_cursor,
            viewed_state,
            notifier,
            change_signal,
            options: SyncOptions {
                batch_size: options.batch_size.max(1),
            },
            _entity: PhantomData,
        }
    }

    /// Returns the options in effect
    pub fn options(&self) -> SyncOptions {
        self.options
    }

    /// Extracts this collection's watermark from a composite snapshot
    fn version_reader(versions: &SyncVersions) -> u64 {
        versions.version(E::COLLECTION)
    }

    /// Runs one sync pass, reporting what it applied
    ///
    /// # Errors
    /// Returns an error if fetching, decoding, or applying the change list
    /// fails. The watermark is left untouched in that case.
    pub async fn run_pass(&self) -> Result<SyncPassReport> {
        let collection = E::COLLECTION;

        // Step 1: Read the watermark
        let versions = self
            .version_cursor
            .read()
            .await
            .context("Failed to read version cursor")?;
        let since = Self::version_reader(&versions);
        let first_sync = since == 0;

        // Step 2: Fetch the change list
        let after = if first_sync { None } else { Some(since) };
        let records = self
            .remote
            .fetch_changes_since(collection, after)
            .await
            .with_context(|| format!("Failed to fetch {collection} change list"))?;
        validate_records(&records)?;

        let changes = ChangeSet::from_records(&records);
        let Some(latest_version) = changes.latest_version() else {
            debug!(since, "Change list empty, nothing to apply");
            return Ok(SyncPassReport::empty(collection, first_sync));
        };

        info!(
            since,
            latest_version,
            first_sync,
            deletes = changes.to_delete().len(),
            updates = changes.to_update().len(),
            "Applying change list"
        );

        let mut report = SyncPassReport::empty(collection, first_sync);

        // Step 3: Deletes first, so a delete always beats an update
        if !changes.to_delete().is_empty() {
            self.local_store
                .delete_many(changes.to_delete())
                .await
                .context("Failed to delete local entities")?;
            report.deleted = changes.to_delete().len();
        }

        // Step 4: Which updated ids exist already (before this pass' upserts)
        let to_update: HashSet<String> = changes.to_update().iter().cloned().collect();
        let existing_ids = if first_sync || to_update.is_empty() {
            HashSet::new()
        } else {
            self.local_store
                .existing_ids(&to_update)
                .await
                .context("Failed to look up existing local ids")?
        };

        // Step 5: Seed the viewed set so history does not show up as unread
        if first_sync && !changes.to_update().is_empty() {
            self.viewed_state
                .set_viewed(collection, changes.to_update(), true)
                .await
                .context("Failed to seed viewed state")?;
        }

        // Step 6: Stream payload batches into the store
        report.upserted = self.update_models(changes.to_update()).await?;

        // Step 7: Data changed
        if report.deleted > 0 || !changes.to_update().is_empty() {
            self.change_signal.notify_data_changed(collection).await;
        }

        // Step 8: Notify about newly added ids
        if !first_sync {
            let newly_added: HashSet<String> =
                to_update.difference(&existing_ids).cloned().collect();
            report.notified = self
                .notify_newly_added(changes.to_update(), &newly_added)
                .await;
        }

        // Step 9: Advance the watermark last
        let stored = self
            .version_cursor
            .update(Box::new(move |current: SyncVersions| {
                current.with_version(collection, latest_version)
            }))
            .await
            .context("Failed to advance version cursor")?;
        report.new_version = Some(Self::version_reader(&stored));

        info!(
            deleted = report.deleted,
            upserted = report.upserted,
            notified = report.notified,
            new_version = ?report.new_version,
            "Sync pass completed"
        );

        Ok(report)
    }

    /// Fetches payloads for `ids` batch by batch and upserts each batch
    ///
    /// Returns the number of entities upserted.
    async fn update_models(&self, ids: &[String]) -> Result<usize> {
        let collection = E::COLLECTION;
        let batch_count = ids.len().div_ceil(self.options.batch_size);
        let mut upserted = 0;

        for (index, batch) in ids.chunks(self.options.batch_size).enumerate() {
            let payloads = self
                .remote
                .fetch_entities_by_ids(collection, batch)
                .await
                .with_context(|| {
                    format!(
                        "Failed to fetch {collection} batch {}/{batch_count}",
                        index + 1
                    )
                })?;

            let mut entities = decode_payloads::<E>(payloads)?;

            // Only requested ids; anything else could resurrect a deleted row
            let requested: HashSet<&str> = batch.iter().map(String::as_str).collect();
            let received = entities.len();
            entities.retain(|e| requested.contains(e.id()));
            if entities.len() < received {
                warn!(
                    dropped = received - entities.len(),
                    "Remote returned payloads for ids that were not requested"
                );
            }
            if entities.len() < batch.len() {
                debug!(
                    requested = batch.len(),
                    received = entities.len(),
                    "Remote omitted some requested ids"
                );
            }

            self.local_store
                .upsert_many(&entities)
                .await
                .with_context(|| {
                    format!(
                        "Failed to upsert {collection} batch {}/{batch_count}",
                        index + 1
                    )
                })?;

            upserted += entities.len();
            debug!(
                batch = index + 1,
                batch_count,
                size = entities.len(),
                "Upserted batch"
            );
        }

        Ok(upserted)
    }

    /// Announces newly added entities if the user enabled notifications
    ///
    /// Notification is a side effect: failures are logged and never fail
    /// the pass. Returns the number of entities announced.
    async fn notify_newly_added(&self, order: &[String], newly_added: &HashSet<String>) -> usize {
        let collection = E::COLLECTION;
        if newly_added.is_empty() {
            return 0;
        }

        match self.viewed_state.is_notification_enabled(collection).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(count = newly_added.len(), "Notifications disabled, skipping");
                return 0;
            }
            Err(err) => {
                warn!(error = %err, "Failed to read notification preference, skipping");
                return 0;
            }
        }

        let mut entities = match self.local_store.read_by_ids(newly_added).await {
            Ok(entities) => entities,
            Err(err) => {
                warn!(error = %err, "Failed to read newly added entities, skipping notification");
                return 0;
            }
        };
        if entities.is_empty() {
            return 0;
        }

        // Keep the remote's order so summaries are stable
        let rank: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(index, id)| (id.as_str(), index))
            .collect();
        entities.sort_by_key(|e| rank.get(e.id()).copied().unwrap_or(usize::MAX));

        let count = entities.len();
        let items = E::into_new_items(entities);

        match self.notifier.notify_new_items(&items).await {
            Ok(()) => {
                info!(count, "Notified about new items");
                count
            }
            Err(err) => {
                warn!(error = %err, "Failed to deliver notification");
                0
            }
        }
    }
}

#[async_trait::async_trait]
impl<E: Entity> CollectionSync for ChangeListSyncEngine<E> {
    fn collection(&self) -> Collection {
        E::COLLECTION
    }

    async fn sync_with(&self) -> SyncOutcome {
        let span = tracing::info_span!("sync_pass", collection = %E::COLLECTION);
        async {
            match self.run_pass().await {
                Ok(_) => SyncOutcome::Succeeded,
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "Sync pass failed, cursor left untouched");
                    SyncOutcome::Failed
                }
            }
        }
        .instrument(span)
        .await
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn validate_records(records: &[ChangeRecord]) -> Result<()> {
    for record in records {
        record
            .validate()
            .map_err(|e| SyncError::InvalidChangeRecord(format!("{e} (version {})", record.version)))?;
    }
    Ok(())
}

fn decode_payloads<E: Entity>(payloads: Vec<EntityPayload>) -> Result<Vec<E>> {
    payloads
        .into_iter()
        .map(|payload| -> Result<E> {
            let entity: E =
                serde_json::from_value(payload).map_err(|e| SyncError::InvalidPayload {
                    collection: E::COLLECTION.key().to_string(),
                    reason: e.to_string(),
                })?;
            entity.validate().map_err(|e| SyncError::InvalidPayload {
                collection: E::COLLECTION.key().to_string(),
                reason: e.to_string(),
            })?;
            Ok(entity)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchday_core::domain::NewsArticle;

    #[test]
    fn test_sync_options_default() {
        assert_eq!(SyncOptions::default().batch_size, 1000);
    }

    #[test]
    fn test_sync_options_from_config_clamps_zero() {
        let mut config = Config::default();
        config.sync.batch_size = 0;
        assert_eq!(SyncOptions::from(&config).batch_size, 1);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(SyncOutcome::Succeeded.to_string(), "succeeded");
        assert_eq!(SyncOutcome::Failed.to_string(), "failed");
        assert!(SyncOutcome::Succeeded.is_success());
        assert!(!SyncOutcome::Failed.is_success());
    }

    #[test]
    fn test_validate_records_rejects_blank_id() {
        let records = vec![ChangeRecord::upsert("1", 1), ChangeRecord::upsert("", 2)];
        let err = validate_records(&records).unwrap_err();
        assert!(format!("{err}").contains("version 2"));
    }

    #[test]
    fn test_decode_payloads() {
        let payloads = vec![serde_json::json!({
            "id": "n1",
            "title": "T",
            "description": "D",
            "publishedAt": "2026-08-01T10:00:00Z"
        })];
        let decoded = decode_payloads::<NewsArticle>(payloads).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].id, "n1");
        assert!(decoded[0].topics.is_empty());
    }

    #[test]
    fn test_decode_payloads_rejects_malformed() {
        let payloads = vec![serde_json::json!({ "id": "n1" })];
        let err = decode_payloads::<NewsArticle>(payloads).unwrap_err();
        assert!(err.to_string().starts_with("Invalid news payload"));
    }

    #[test]
    fn test_decode_payloads_rejects_empty_id() {
        let payloads = vec![serde_json::json!({
            "id": "",
            "title": "T",
            "description": "D",
            "publishedAt": "2026-08-01T10:00:00Z"
        })];
        assert!(decode_payloads::<NewsArticle>(payloads).is_err());
    }
}
