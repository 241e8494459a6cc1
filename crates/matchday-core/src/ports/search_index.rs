//! Full-text search index port (driven/secondary port)
//!
//! The index is a downstream consumer of the local store. The orchestrator
//! asks for a rebuild once every collection synced successfully.

/// Port trait for the full-text search index
#[async_trait::async_trait]
pub trait ISearchIndex: Send + Sync {
    /// Repopulates the index from the current local store contents
    async fn rebuild(&self) -> anyhow::Result<()>;
}
