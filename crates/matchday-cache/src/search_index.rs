//! SQLite FTS5 implementation of ISearchIndex
//!
//! The index is derived data: [`ISearchIndex::rebuild`] clears it and
//! repopulates it from the entity tables in one transaction, so readers
//! never observe a half-built index.

use sqlx::{Row, SqlitePool};

use matchday_core::domain::{Collection, Entity, NewsArticle, Transfer};
use matchday_core::ports::ISearchIndex;

use crate::CacheError;

/// A single full-text search match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Collection of the matched entity
    pub collection: Collection,
    /// Id of the matched entity
    pub entity_id: String,
}

/// Full-text index over every stored entity
pub struct SqliteSearchIndex {
    pool: SqlitePool,
}

impl SqliteSearchIndex {
    /// Creates a new index with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Searches the index, best matches first
    ///
    /// `query` uses FTS5 query syntax. Returns at most `limit` hits.
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchHit>, CacheError> {
        let rows = sqlx::query(
            "SELECT collection, entity_id FROM search_index \
             WHERE search_index MATCH ? ORDER BY rank LIMIT ?",
        )
        .bind(query)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<SearchHit, CacheError> {
                let key: String = row.try_get("collection")?;
                let collection = key
                    .parse::<Collection>()
                    .map_err(|e| CacheError::SerializationError(e.to_string()))?;
                Ok(SearchHit {
                    collection,
                    entity_id: row.try_get("entity_id")?,
                })
            })
            .collect()
    }

    /// Number of indexed documents
    pub async fn len(&self) -> Result<u64, CacheError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM search_index")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    /// Returns true if nothing is indexed
    pub async fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len().await? == 0)
    }
}

/// Reads `(id, search text)` pairs for every stored entity of type `E`
async fn documents<E: Entity>(
    conn: &mut sqlx::SqliteConnection,
) -> Result<Vec<(String, String)>, CacheError> {
    let sql = format!("SELECT payload FROM {}", E::COLLECTION.key());
    let payloads: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&mut *conn).await?;

    payloads
        .iter()
        .map(|payload| -> Result<(String, String), CacheError> {
            let entity: E = serde_json::from_str(payload)?;
            Ok((entity.id().to_string(), entity.search_text()))
        })
        .collect()
}

#[async_trait::async_trait]
impl ISearchIndex for SqliteSearchIndex {
    async fn rebuild(&self) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM search_index")
            .execute(&mut *tx)
            .await?;

        let mut indexed = 0usize;
        for collection in Collection::ALL {
            let docs = match collection {
                Collection::News => documents::<NewsArticle>(&mut tx).await?,
                Collection::Transfers => documents::<Transfer>(&mut tx).await?,
            };
            for (id, body) in &docs {
                sqlx::query("INSERT INTO search_index (collection, entity_id, body) VALUES (?, ?, ?)")
                    .bind(collection.key())
                    .bind(id.as_str())
                    .bind(body.as_str())
                    .execute(&mut *tx)
                    .await?;
            }
            indexed += docs.len();
        }

        tx.commit().await?;
        tracing::info!(documents = indexed, "Search index rebuilt");
        Ok(())
    }
}
