//! Push topic subscription port (driven/secondary port)

/// Port trait for out-of-band push topics (e.g. "general" announcements)
#[async_trait::async_trait]
pub trait IPushTopics: Send + Sync {
    /// Subscribes to `topic`; subscribing twice is a no-op
    async fn subscribe(&self, topic: &str) -> anyhow::Result<()>;
}
