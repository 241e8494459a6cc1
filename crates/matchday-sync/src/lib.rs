//! Matchday Sync - Offline-first incremental synchronization
//!
//! Provides:
//! - Per-collection reconciliation against version-stamped change lists
//! - Concurrent sync of every collection with an aggregated outcome
//! - Periodic scheduling with exponential retry backoff
//! - A broadcast "data changed" signal for downstream observers
//!
//! ## Modules
//!
//! - [`engine`] - [`ChangeListSyncEngine`], one collection's sync pass
//! - [`orchestrator`] - [`SyncOrchestrator`], fork-join over all collections
//! - [`scheduler`] - [`SyncScheduler`], periodic runs and retries
//! - [`signal`] - [`ChangeBroadcaster`], `IChangeDataSignal` over a broadcast channel

pub mod engine;
pub mod orchestrator;
pub mod scheduler;
pub mod signal;

pub use engine::{ChangeListSyncEngine, CollectionSync, SyncOptions, SyncOutcome, SyncPassReport};
pub use orchestrator::{RunOutcome, SyncOrchestrator, SyncRunner};
pub use scheduler::SyncScheduler;
pub use signal::ChangeBroadcaster;

use thiserror::Error;

/// Errors raised inside a sync pass
///
/// Collaborator failures arrive as `anyhow::Error` from the ports and are
/// wrapped with context instead; these variants cover problems the engine
/// detects itself.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote returned a change record that cannot be applied
    #[error("Invalid change record: {0}")]
    InvalidChangeRecord(String),

    /// An entity payload could not be decoded into the collection's type
    #[error("Invalid {collection} payload: {reason}")]
    InvalidPayload {
        /// Collection key
        collection: String,
        /// Decoding or validation failure
        reason: String,
    },
}
