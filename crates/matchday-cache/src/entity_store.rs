//! SQLite implementation of ILocalStore
//!
//! Each collection has its own table (`news`, `transfers`) with the entity
//! stored as its JSON payload keyed by id.
//!
//! ## Type Mapping
//!
//! | Domain Type   | SQL Type | Strategy                                |
//! |---------------|----------|-----------------------------------------|
//! | Entity id     | TEXT     | Primary key                             |
//! | Entity        | TEXT     | serde_json serialization of the payload |
//! | Write time    | TEXT     | ISO 8601 via `to_rfc3339()`             |

use std::collections::HashSet;
use std::marker::PhantomData;

use chrono::Utc;
use sqlx::SqlitePool;

use matchday_core::domain::Entity;
use matchday_core::ports::ILocalStore;

use crate::{placeholders, CacheError, MAX_BIND_IDS};

/// SQLite-backed store for one entity collection
pub struct SqliteEntityStore<E: Entity> {
    pool: SqlitePool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> SqliteEntityStore<E> {
    /// Creates a new store instance with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    /// Table holding this collection's rows
    fn table() -> &'static str {
        E::COLLECTION.key()
    }

    /// Reads a single entity by id
    pub async fn get(&self, id: &str) -> Result<Option<E>, CacheError> {
        let sql = format!("SELECT payload FROM {} WHERE id = ?", Self::table());
        let payload: Option<String> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        payload.map(|p| decode::<E>(&p)).transpose()
    }

    /// Reads every stored entity
    pub async fn read_all(&self) -> Result<Vec<E>, CacheError> {
        let sql = format!("SELECT payload FROM {} ORDER BY id", Self::table());
        let payloads: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;
        payloads.iter().map(|p| decode::<E>(p)).collect()
    }
}

fn decode<E: Entity>(payload: &str) -> Result<E, CacheError> {
    serde_json::from_str(payload).map_err(|e| {
        CacheError::SerializationError(format!(
            "Failed to decode stored {} payload: {}",
            E::COLLECTION,
            e
        ))
    })
}

#[async_trait::async_trait]
impl<E: Entity> ILocalStore<E> for SqliteEntityStore<E> {
    async fn upsert_many(&self, entities: &[E]) -> anyhow::Result<()> {
        if entities.is_empty() {
            return Ok(());
        }

        let sql = format!(
            "INSERT INTO {} (id, payload, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET payload = excluded.payload, \
             updated_at = excluded.updated_at",
            Self::table()
        );
        let now = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;
        for entity in entities {
            let payload = serde_json::to_string(entity).map_err(CacheError::from)?;
            sqlx::query(&sql)
                .bind(entity.id())
                .bind(&payload)
                .bind(&now)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::trace!(
            collection = %E::COLLECTION,
            count = entities.len(),
            "Upserted entities"
        );
        Ok(())
    }

    async fn delete_many(&self, ids: &[String]) -> anyhow::Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for chunk in ids.chunks(MAX_BIND_IDS) {
            let sql = format!(
                "DELETE FROM {} WHERE id IN ({})",
                Self::table(),
                placeholders(chunk.len())
            );
            let mut query = sqlx::query(&sql);
            for id in chunk {
                query = query.bind(id.as_str());
            }
            query.execute(&mut *tx).await?;
        }
        tx.commit().await?;

        tracing::trace!(collection = %E::COLLECTION, count = ids.len(), "Deleted entities");
        Ok(())
    }

    async fn existing_ids(
        &self,
        candidate_ids: &HashSet<String>,
    ) -> anyhow::Result<HashSet<String>> {
        let candidates: Vec<&String> = candidate_ids.iter().collect();
        let mut existing = HashSet::new();

        for chunk in candidates.chunks(MAX_BIND_IDS) {
            let sql = format!(
                "SELECT id FROM {} WHERE id IN ({})",
                Self::table(),
                placeholders(chunk.len())
            );
            let mut query = sqlx::query_scalar::<_, String>(&sql);
            for id in chunk {
                query = query.bind(id.as_str());
            }
            existing.extend(query.fetch_all(&self.pool).await?);
        }

        Ok(existing)
    }

    async fn read_by_ids(&self, ids: &HashSet<String>) -> anyhow::Result<Vec<E>> {
        let wanted: Vec<&String> = ids.iter().collect();
        let mut entities = Vec::with_capacity(wanted.len());

        for chunk in wanted.chunks(MAX_BIND_IDS) {
            let sql = format!(
                "SELECT payload FROM {} WHERE id IN ({})",
                Self::table(),
                placeholders(chunk.len())
            );
            let mut query = sqlx::query_scalar::<_, String>(&sql);
            for id in chunk {
                query = query.bind(id.as_str());
            }
            for payload in query.fetch_all(&self.pool).await? {
                entities.push(decode::<E>(&payload)?);
            }
        }

        Ok(entities)
    }

    async fn all_ids(&self) -> anyhow::Result<HashSet<String>> {
        let sql = format!("SELECT id FROM {}", Self::table());
        let ids: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;
        Ok(ids.into_iter().collect())
    }

    async fn count(&self) -> anyhow::Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", Self::table());
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count as u64)
    }
}
