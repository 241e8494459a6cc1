//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. The sync engine depends on these traits; their
//! implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteChangeSource`] - Remote change lists and entity payloads
//! - [`ILocalStore`] - Per-collection local entity persistence
//! - [`IVersionCursor`] - Atomic composite version watermark
//! - [`IViewedStateStore`] - Viewed/bookmarked sets and notification preferences
//! - [`INotifier`] - Local "new items" notifications
//! - [`IChangeDataSignal`] - "Data changed" signal for downstream observers
//! - [`ISearchIndex`] - Full-text index repopulation
//! - [`IPushTopics`] - Out-of-band push topic subscriptions

pub mod change_signal;
pub mod local_store;
pub mod notifier;
pub mod push_topics;
pub mod remote_source;
pub mod search_index;
pub mod version_cursor;
pub mod viewed_state;

pub use change_signal::IChangeDataSignal;
pub use local_store::ILocalStore;
pub use notifier::{INotifier, NewItemsNotification};
pub use push_topics::IPushTopics;
pub use remote_source::{EntityPayload, IRemoteChangeSource};
pub use search_index::ISearchIndex;
pub use version_cursor::{IVersionCursor, VersionTransform};
pub use viewed_state::IViewedStateStore;
