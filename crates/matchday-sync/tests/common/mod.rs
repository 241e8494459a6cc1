//! Shared in-memory fakes for sync engine and orchestrator tests
//!
//! Every port has a recording fake so tests can assert on side effects
//! (notifications sent, signals raised, batch sizes requested) without a
//! database or an HTTP server.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use chrono::{TimeZone, Utc};

use matchday_core::domain::{
    ChangeRecord, Collection, Entity, NewItems, NewsArticle, SyncVersions, Transfer,
};
use matchday_core::ports::{
    EntityPayload, IChangeDataSignal, ILocalStore, INotifier, IPushTopics, IRemoteChangeSource,
    ISearchIndex, IVersionCursor, IViewedStateStore, VersionTransform,
};
use matchday_sync::{ChangeListSyncEngine, SyncOptions};

// ============================================================================
// Entity builders
// ============================================================================

pub fn article(id: &str) -> NewsArticle {
    NewsArticle {
        id: id.to_string(),
        title: format!("Headline {id}"),
        description: format!("Story {id}"),
        topics: vec!["league".to_string()],
        image_url: None,
        published_at: Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap(),
    }
}

pub fn transfer(id: &str) -> Transfer {
    Transfer {
        id: id.to_string(),
        player_name: format!("Player {id}"),
        from_club: "Rovers".to_string(),
        to_club: "United".to_string(),
        price: Some("12m".to_string()),
        position: Some("Midfielder".to_string()),
        announced_at: Utc.with_ymd_and_hms(2026, 8, 2, 9, 30, 0).unwrap(),
    }
}

pub fn ids(values: &[&str]) -> HashSet<String> {
    values.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// FakeRemote
// ============================================================================

/// Remote source backed by per-collection change logs and payload maps
///
/// `fetch_changes_since` returns the records with `version > after`, so a
/// second pass without new records sees an empty list.
#[derive(Default)]
pub struct FakeRemote {
    changes: Mutex<HashMap<Collection, Vec<ChangeRecord>>>,
    payloads: Mutex<HashMap<(Collection, String), EntityPayload>>,
    unrequested: Mutex<HashMap<Collection, Vec<EntityPayload>>>,
    fail_changes: Mutex<HashSet<Collection>>,
    fail_on_batch: Mutex<Option<usize>>,
    change_queries: Mutex<Vec<(Collection, Option<u64>)>>,
    batch_requests: Mutex<Vec<(Collection, Vec<String>)>>,
}

impl FakeRemote {
    pub fn push_change(&self, collection: Collection, record: ChangeRecord) {
        self.changes
            .lock()
            .unwrap()
            .entry(collection)
            .or_default()
            .push(record);
    }

    pub fn put_payload<E: Entity>(&self, entity: &E) {
        let payload = serde_json::to_value(entity).unwrap();
        self.payloads
            .lock()
            .unwrap()
            .insert((E::COLLECTION, entity.id().to_string()), payload);
    }

    pub fn put_raw_payload(&self, collection: Collection, id: &str, payload: EntityPayload) {
        self.payloads
            .lock()
            .unwrap()
            .insert((collection, id.to_string()), payload);
    }

    /// Appends `entity` to every batch response, whatever ids were asked for
    pub fn always_return<E: Entity>(&self, entity: &E) {
        let payload = serde_json::to_value(entity).unwrap();
        self.unrequested
            .lock()
            .unwrap()
            .entry(E::COLLECTION)
            .or_default()
            .push(payload);
    }

    /// Publishes a new or updated article: payload plus change record
    pub fn publish_article(&self, id: &str, version: u64) {
        self.put_payload(&article(id));
        self.push_change(Collection::News, ChangeRecord::upsert(id, version));
    }

    pub fn publish_transfer(&self, id: &str, version: u64) {
        self.put_payload(&transfer(id));
        self.push_change(Collection::Transfers, ChangeRecord::upsert(id, version));
    }

    pub fn fail_changes_for(&self, collection: Collection) {
        self.fail_changes.lock().unwrap().insert(collection);
    }

    pub fn heal(&self) {
        self.fail_changes.lock().unwrap().clear();
        *self.fail_on_batch.lock().unwrap() = None;
    }

    /// Makes the `n`-th batch request (1-based, counted over all requests) fail
    pub fn fail_on_batch(&self, n: usize) {
        *self.fail_on_batch.lock().unwrap() = Some(n);
    }

    pub fn change_queries(&self) -> Vec<(Collection, Option<u64>)> {
        self.change_queries.lock().unwrap().clone()
    }

    pub fn batch_sizes(&self, collection: Collection) -> Vec<usize> {
        self.batch_requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == collection)
            .map(|(_, batch)| batch.len())
            .collect()
    }
}

#[async_trait::async_trait]
impl IRemoteChangeSource for FakeRemote {
    async fn fetch_changes_since(
        &self,
        collection: Collection,
        after_version: Option<u64>,
    ) -> Result<Vec<ChangeRecord>> {
        self.change_queries
            .lock()
            .unwrap()
            .push((collection, after_version));
        if self.fail_changes.lock().unwrap().contains(&collection) {
            bail!("change list for {collection} unavailable");
        }
        let after = after_version.unwrap_or(0);
        Ok(self
            .changes
            .lock()
            .unwrap()
            .get(&collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.version > after)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_entities_by_ids(
        &self,
        collection: Collection,
        ids: &[String],
    ) -> Result<Vec<EntityPayload>> {
        let request_number = {
            let mut requests = self.batch_requests.lock().unwrap();
            requests.push((collection, ids.to_vec()));
            requests.len()
        };
        if *self.fail_on_batch.lock().unwrap() == Some(request_number) {
            bail!("batch {request_number} timed out");
        }
        let payloads = self.payloads.lock().unwrap();
        let mut response: Vec<EntityPayload> = ids
            .iter()
            .filter_map(|id| payloads.get(&(collection, id.clone())).cloned())
            .collect();
        if let Some(extra) = self.unrequested.lock().unwrap().get(&collection) {
            response.extend(extra.iter().cloned());
        }
        Ok(response)
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

pub struct MemoryStore<E: Entity> {
    rows: Mutex<BTreeMap<String, E>>,
    upsert_calls: AtomicUsize,
    fail_upserts: AtomicBool,
}

impl<E: Entity> Default for MemoryStore<E> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(BTreeMap::new()),
            upsert_calls: AtomicUsize::new(0),
            fail_upserts: AtomicBool::new(false),
        }
    }
}

impl<E: Entity> MemoryStore<E> {
    pub fn seed(&self, entities: Vec<E>) {
        let mut rows = self.rows.lock().unwrap();
        for e in entities {
            rows.insert(e.id().to_string(), e);
        }
    }

    pub fn ids(&self) -> HashSet<String> {
        self.rows.lock().unwrap().keys().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<E> {
        self.rows.lock().unwrap().get(id).cloned()
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn set_fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl<E: Entity> ILocalStore<E> for MemoryStore<E> {
    async fn upsert_many(&self, entities: &[E]) -> Result<()> {
        if self.fail_upserts.load(Ordering::SeqCst) {
            bail!("disk full");
        }
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        for e in entities {
            rows.insert(e.id().to_string(), e.clone());
        }
        Ok(())
    }

    async fn delete_many(&self, ids: &[String]) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        for id in ids {
            rows.remove(id);
        }
        Ok(())
    }

    async fn existing_ids(&self, candidate_ids: &HashSet<String>) -> Result<HashSet<String>> {
        let rows = self.rows.lock().unwrap();
        Ok(candidate_ids
            .iter()
            .filter(|id| rows.contains_key(id.as_str()))
            .cloned()
            .collect())
    }

    async fn read_by_ids(&self, ids: &HashSet<String>) -> Result<Vec<E>> {
        let rows = self.rows.lock().unwrap();
        Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
    }

    async fn all_ids(&self) -> Result<HashSet<String>> {
        Ok(self.ids())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.rows.lock().unwrap().len() as u64)
    }
}

// ============================================================================
// MemoryCursor
// ============================================================================

#[derive(Default)]
pub struct MemoryCursor {
    versions: Mutex<SyncVersions>,
    history: Mutex<Vec<SyncVersions>>,
    fail_updates: AtomicBool,
}

impl MemoryCursor {
    pub fn set(&self, versions: SyncVersions) {
        *self.versions.lock().unwrap() = versions;
    }

    pub fn get(&self) -> SyncVersions {
        *self.versions.lock().unwrap()
    }

    /// Every value stored through `update`, in order
    pub fn history(&self) -> Vec<SyncVersions> {
        self.history.lock().unwrap().clone()
    }

    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl IVersionCursor for MemoryCursor {
    async fn read(&self) -> Result<SyncVersions> {
        Ok(self.get())
    }

    async fn update(&self, transform: VersionTransform) -> Result<SyncVersions> {
        if self.fail_updates.load(Ordering::SeqCst) {
            bail!("cursor store locked");
        }
        let mut versions = self.versions.lock().unwrap();
        *versions = transform(*versions);
        self.history.lock().unwrap().push(*versions);
        Ok(*versions)
    }
}

// ============================================================================
// MemoryViewedState
// ============================================================================

#[derive(Default)]
pub struct MemoryViewedState {
    viewed: Mutex<HashSet<(Collection, String)>>,
    bookmarks: Mutex<HashSet<(Collection, String)>>,
    disabled_notifications: Mutex<HashSet<Collection>>,
}

impl MemoryViewedState {
    pub fn viewed(&self, collection: Collection) -> HashSet<String> {
        self.viewed
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == collection)
            .map(|(_, id)| id.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl IViewedStateStore for MemoryViewedState {
    async fn set_viewed(&self, collection: Collection, ids: &[String], viewed: bool) -> Result<()> {
        let mut set = self.viewed.lock().unwrap();
        for id in ids {
            if viewed {
                set.insert((collection, id.clone()));
            } else {
                set.remove(&(collection, id.clone()));
            }
        }
        Ok(())
    }

    async fn is_viewed(&self, collection: Collection, id: &str) -> Result<bool> {
        Ok(self
            .viewed
            .lock()
            .unwrap()
            .contains(&(collection, id.to_string())))
    }

    async fn viewed_ids(&self, collection: Collection) -> Result<HashSet<String>> {
        Ok(self.viewed(collection))
    }

    async fn toggle_bookmark(&self, collection: Collection, id: &str) -> Result<bool> {
        let mut set = self.bookmarks.lock().unwrap();
        let key = (collection, id.to_string());
        if set.remove(&key) {
            Ok(false)
        } else {
            set.insert(key);
            Ok(true)
        }
    }

    async fn bookmarked_ids(&self, collection: Collection) -> Result<HashSet<String>> {
        Ok(self
            .bookmarks
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == collection)
            .map(|(_, id)| id.clone())
            .collect())
    }

    async fn is_notification_enabled(&self, collection: Collection) -> Result<bool> {
        Ok(!self
            .disabled_notifications
            .lock()
            .unwrap()
            .contains(&collection))
    }

    async fn set_notification_enabled(&self, collection: Collection, enabled: bool) -> Result<()> {
        let mut disabled = self.disabled_notifications.lock().unwrap();
        if enabled {
            disabled.remove(&collection);
        } else {
            disabled.insert(collection);
        }
        Ok(())
    }
}

// ============================================================================
// Recording collaborators
// ============================================================================

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<NewItems>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<NewItems> {
        self.sent.lock().unwrap().clone()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl INotifier for RecordingNotifier {
    async fn notify_new_items(&self, items: &NewItems) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("notification daemon unreachable");
        }
        self.sent.lock().unwrap().push(items.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSignal {
    signals: Mutex<Vec<Collection>>,
}

impl RecordingSignal {
    pub fn signals(&self) -> Vec<Collection> {
        self.signals.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl IChangeDataSignal for RecordingSignal {
    async fn notify_data_changed(&self, collection: Collection) {
        self.signals.lock().unwrap().push(collection);
    }
}

#[derive(Default)]
pub struct RecordingIndex {
    rebuilds: AtomicUsize,
    fail: AtomicBool,
}

impl RecordingIndex {
    pub fn rebuilds(&self) -> usize {
        self.rebuilds.load(Ordering::SeqCst)
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl ISearchIndex for RecordingIndex {
    async fn rebuild(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("index corrupted");
        }
        self.rebuilds.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingTopics {
    subscribed: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl RecordingTopics {
    pub fn subscribed(&self) -> Vec<String> {
        self.subscribed.lock().unwrap().clone()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl IPushTopics for RecordingTopics {
    async fn subscribe(&self, topic: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("push service offline");
        }
        self.subscribed.lock().unwrap().push(topic.to_string());
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

/// All fakes wired together, shared by both collections
#[derive(Default)]
pub struct Harness {
    pub remote: Arc<FakeRemote>,
    pub news: Arc<MemoryStore<NewsArticle>>,
    pub transfers: Arc<MemoryStore<Transfer>>,
    pub cursor: Arc<MemoryCursor>,
    pub viewed: Arc<MemoryViewedState>,
    pub notifier: Arc<RecordingNotifier>,
    pub signal: Arc<RecordingSignal>,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn news_engine(&self) -> ChangeListSyncEngine<NewsArticle> {
        self.news_engine_with_batch(SyncOptions::default().batch_size)
    }

    pub fn news_engine_with_batch(&self, batch_size: usize) -> ChangeListSyncEngine<NewsArticle> {
        ChangeListSyncEngine::new(
            self.remote.clone(),
            self.news.clone(),
            self.cursor.clone(),
            self.viewed.clone(),
            self.notifier.clone(),
            self.signal.clone(),
            SyncOptions { batch_size },
        )
    }

    pub fn transfer_engine(&self) -> ChangeListSyncEngine<Transfer> {
        ChangeListSyncEngine::new(
            self.remote.clone(),
            self.transfers.clone(),
            self.cursor.clone(),
            self.viewed.clone(),
            self.notifier.clone(),
            self.signal.clone(),
            SyncOptions::default(),
        )
    }
}
