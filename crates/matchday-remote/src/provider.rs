//! HttpChangeSource - IRemoteChangeSource implementation over the HTTP API
//!
//! ## Endpoints
//!
//! - `GET /{collection}/changes?after={version}` returns the change records
//!   after `version`; `after` is omitted on a first sync
//! - `POST /{collection}/batch` with `{"ids": [...]}` returns the payloads of
//!   the requested ids that still exist
//!
//! ## Design Notes
//!
//! - Payloads are passed through as raw JSON; the sync engine decodes them
//!   into the collection's entity type.
//! - Retries happen inside [`ApiClient`]; an error reaching this layer
//!   aborts the caller's sync pass.

use anyhow::{Context, Result};
use tracing::debug;

use matchday_core::domain::{ChangeRecord, Collection};
use matchday_core::ports::{EntityPayload, IRemoteChangeSource};

use crate::client::ApiClient;

/// Remote change source backed by the Matchday HTTP API
pub struct HttpChangeSource {
    client: ApiClient,
}

impl HttpChangeSource {
    /// Creates a new change source using the given client
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Returns the underlying client
    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait::async_trait]
impl IRemoteChangeSource for HttpChangeSource {
    async fn fetch_changes_since(
        &self,
        collection: Collection,
        after_version: Option<u64>,
    ) -> Result<Vec<ChangeRecord>> {
        let path = format!("/{}/changes", collection.key());
        let query: Vec<(&str, String)> = after_version
            .map(|v| vec![("after", v.to_string())])
            .unwrap_or_default();

        let records: Vec<ChangeRecord> = self
            .client
            .get_json(&path, &query)
            .await
            .with_context(|| format!("GET {path} failed"))?;

        debug!(
            collection = %collection,
            after = ?after_version,
            count = records.len(),
            "Fetched change list"
        );
        Ok(records)
    }

    async fn fetch_entities_by_ids(
        &self,
        collection: Collection,
        ids: &[String],
    ) -> Result<Vec<EntityPayload>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let path = format!("/{}/batch", collection.key());
        let body = serde_json::json!({ "ids": ids });

        let payloads: Vec<EntityPayload> = self
            .client
            .post_json(&path, &body)
            .await
            .with_context(|| format!("POST {path} failed for {} ids", ids.len()))?;

        debug!(
            collection = %collection,
            requested = ids.len(),
            received = payloads.len(),
            "Fetched entity batch"
        );
        Ok(payloads)
    }
}
