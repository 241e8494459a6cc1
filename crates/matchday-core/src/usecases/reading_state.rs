//! Reading state use case
//!
//! Tracks what the user has opened and bookmarked for one collection, and
//! derives the unread set from the local store. The sync engine seeds the
//! viewed set on a first sync; everything after that goes through here.

use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::{
    domain::{Collection, Entity},
    ports::{ILocalStore, IViewedStateStore},
};

/// Use case for per-user reading state of one entity collection
pub struct ReadingStateUseCase<E: Entity> {
    viewed_state: Arc<dyn IViewedStateStore + Send + Sync>,
    local_store: Arc<dyn ILocalStore<E> + Send + Sync>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> ReadingStateUseCase<E> {
    /// Creates a new ReadingStateUseCase with the required dependencies
    pub fn new(
        viewed_state: Arc<dyn IViewedStateStore + Send + Sync>,
        local_store: Arc<dyn ILocalStore<E> + Send + Sync>,
    ) -> Self {
        Self {
            viewed_state,
            local_store,
            _entity: PhantomData,
        }
    }

    fn collection(&self) -> Collection {
        E::COLLECTION
    }

    /// Marks a single entity as viewed
    pub async fn mark_viewed(&self, id: &str) -> Result<()> {
        self.viewed_state
            .set_viewed(self.collection(), &[id.to_string()], true)
            .await
            .with_context(|| format!("Failed to mark {} '{id}' as viewed", self.collection()))
    }

    /// Marks every stored entity of the collection as viewed
    pub async fn mark_all_viewed(&self) -> Result<usize> {
        let ids: Vec<String> = self
            .local_store
            .all_ids()
            .await
            .context("Failed to list local ids")?
            .into_iter()
            .collect();

        if !ids.is_empty() {
            self.viewed_state
                .set_viewed(self.collection(), &ids, true)
                .await
                .context("Failed to mark all items as viewed")?;
        }
        Ok(ids.len())
    }

    /// Flips the bookmark flag of an entity, returning the new state
    pub async fn toggle_bookmark(&self, id: &str) -> Result<bool> {
        self.viewed_state
            .toggle_bookmark(self.collection(), id)
            .await
            .with_context(|| format!("Failed to toggle bookmark for {} '{id}'", self.collection()))
    }

    /// Bookmarked entities that are still present locally
    pub async fn bookmarked(&self) -> Result<Vec<E>> {
        let ids = self
            .viewed_state
            .bookmarked_ids(self.collection())
            .await
            .context("Failed to read bookmarks")?;
        self.local_store
            .read_by_ids(&ids)
            .await
            .context("Failed to read bookmarked entities")
    }

    /// Ids stored locally but not yet viewed
    pub async fn unread_ids(&self) -> Result<HashSet<String>> {
        let all = self
            .local_store
            .all_ids()
            .await
            .context("Failed to list local ids")?;
        let viewed = self
            .viewed_state
            .viewed_ids(self.collection())
            .await
            .context("Failed to read viewed ids")?;
        Ok(all.difference(&viewed).cloned().collect())
    }
}
