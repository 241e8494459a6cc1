//! Sync orchestrator - fork-join over every managed collection
//!
//! One orchestrator run:
//!
//! 1. Subscribes to the configured push topics (not gated on success)
//! 2. Runs every collection's sync pass concurrently and awaits all of them
//! 3. ANDs the per-collection outcomes
//! 4. On success only, rebuilds the full-text search index
//!
//! A failed collection does not roll back collections that succeeded; their
//! watermarks have already advanced. The run is reported as
//! [`RunOutcome::Retry`] and the scheduler tries again later.

use std::fmt;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{info, warn};

use matchday_core::domain::Collection;
use matchday_core::ports::{IPushTopics, ISearchIndex};

use crate::engine::{CollectionSync, SyncOutcome};

/// Aggregate result of an orchestrator run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every collection synced and the search index was rebuilt
    Success,
    /// Something failed; the whole run should be retried later
    Retry,
}

impl RunOutcome {
    /// Returns true for [`RunOutcome::Success`]
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success)
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Success => write!(f, "success"),
            RunOutcome::Retry => write!(f, "retry"),
        }
    }
}

/// Something that performs a complete sync run
///
/// Implemented by [`SyncOrchestrator`]; the scheduler only depends on this.
#[async_trait::async_trait]
pub trait SyncRunner: Send + Sync {
    /// Performs one run and reports whether it should be retried
    async fn run(&self) -> RunOutcome;
}

/// Drives the sync engines of every managed collection
pub struct SyncOrchestrator {
    engines: Vec<Arc<dyn CollectionSync>>,
    search_index: Arc<dyn ISearchIndex + Send + Sync>,
    push_topics: Arc<dyn IPushTopics + Send + Sync>,
    topics: Vec<String>,
}

impl SyncOrchestrator {
    /// Creates a new orchestrator
    ///
    /// # Arguments
    /// * `engines` - One engine per managed collection
    /// * `search_index` - Index rebuilt after a fully successful run
    /// * `push_topics` - Push subscription adapter
    /// * `topics` - Topics subscribed at the start of every run
    pub fn new(
        engines: Vec<Arc<dyn CollectionSync>>,
        search_index: Arc<dyn ISearchIndex + Send + Sync>,
        push_topics: Arc<dyn IPushTopics + Send + Sync>,
        topics: Vec<String>,
    ) -> Self {
        Self {
            engines,
            search_index,
            push_topics,
            topics,
        }
    }

    /// Collections driven by this orchestrator
    pub fn collections(&self) -> Vec<Collection> {
        self.engines.iter().map(|e| e.collection()).collect()
    }

    async fn subscribe_topics(&self) {
        for topic in &self.topics {
            if let Err(err) = self.push_topics.subscribe(topic).await {
                warn!(topic = %topic, error = %err, "Failed to subscribe to push topic");
            }
        }
    }

    /// Runs every collection concurrently and returns the per-collection outcomes
    pub async fn sync_all(&self) -> Vec<(Collection, SyncOutcome)> {
        let passes = self.engines.iter().map(|engine| async move {
            (engine.collection(), engine.sync_with().await)
        });
        join_all(passes).await
    }
}

#[async_trait::async_trait]
impl SyncRunner for SyncOrchestrator {
    #[tracing::instrument(skip(self))]
    async fn run(&self) -> RunOutcome {
        self.subscribe_topics().await;

        let outcomes = self.sync_all().await;
        let failed: Vec<Collection> = outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.is_success())
            .map(|(collection, _)| *collection)
            .collect();

        if !failed.is_empty() {
            warn!(
                failed = ?failed,
                "Sync run incomplete, skipping search index rebuild"
            );
            return RunOutcome::Retry;
        }

        if let Err(err) = self.search_index.rebuild().await {
            warn!(error = %format!("{err:#}"), "Search index rebuild failed");
            return RunOutcome::Retry;
        }

        info!(collections = outcomes.len(), "Sync run succeeded");
        RunOutcome::Success
    }
}
