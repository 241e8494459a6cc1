//! "Data changed" signal over a tokio broadcast channel
//!
//! Observers (UI layers, the daemon's logging task) subscribe to receive the
//! collection that changed. Slow receivers may lag and miss intermediate
//! signals; a signal only means "re-read the collection", so that is fine.

use tokio::sync::broadcast;
use tracing::debug;

use matchday_core::domain::Collection;
use matchday_core::ports::IChangeDataSignal;

/// Default channel capacity
pub const DEFAULT_CAPACITY: usize = 64;

/// Fans "data changed" signals out to every subscriber
#[derive(Debug, Clone)]
pub struct ChangeBroadcaster {
    sender: broadcast::Sender<Collection>,
}

impl ChangeBroadcaster {
    /// Creates a broadcaster buffering up to `capacity` signals per receiver
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns a new receiver for subsequent signals
    pub fn subscribe(&self) -> broadcast::Receiver<Collection> {
        self.sender.subscribe()
    }

    /// Number of live receivers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait::async_trait]
impl IChangeDataSignal for ChangeBroadcaster {
    async fn notify_data_changed(&self, collection: Collection) {
        if self.sender.send(collection).is_err() {
            debug!(collection = %collection, "No subscribers for data changed signal");
        }
    }
}
