//! Notifier port (driven/secondary port)
//!
//! This module defines the interface for announcing newly synced items to
//! the user. Implementations render the notification on whatever surface
//! the platform offers.
//!
//! ## Design Notes
//!
//! - Notifications are fire-and-forget; the sync engine logs delivery
//!   errors and never fails a pass because of them.
//! - The port receives the full entities ([`NewItems`]). Adapters that only
//!   need text call [`NewItems::render`], so every surface shows the same
//!   wording.

use serde::{Deserialize, Serialize};

use crate::domain::{Collection, Entity, NewItems};

/// Maximum number of item lines listed in a summary notification
pub const SUMMARY_MAX_LINES: usize = 5;

/// A rendered "new items" notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItemsNotification {
    /// Collection the items belong to
    pub collection: Collection,
    /// Ids of the announced items
    pub entity_ids: Vec<String>,
    /// Title of the notification
    pub title: String,
    /// Body text
    pub body: String,
}

impl NewItemsNotification {
    /// Renders a notification for newly added entities
    ///
    /// A single entity is announced with its own title and body. Several
    /// entities produce a summary ("3 new transfers") listing up to
    /// [`SUMMARY_MAX_LINES`] titles. Returns `None` for an empty slice.
    pub fn for_entities<E: Entity>(entities: &[E]) -> Option<Self> {
        let collection = E::COLLECTION;
        let entity_ids = entities.iter().map(|e| e.id().to_string()).collect();

        match entities {
            [] => None,
            [single] => Some(Self {
                collection,
                entity_ids,
                title: single.notification_title(),
                body: single.notification_body(),
            }),
            many => {
                let mut lines: Vec<String> = many
                    .iter()
                    .take(SUMMARY_MAX_LINES)
                    .map(|e| e.notification_title())
                    .collect();
                if many.len() > SUMMARY_MAX_LINES {
                    lines.push(format!("and {} more", many.len() - SUMMARY_MAX_LINES));
                }
                Some(Self {
                    collection,
                    entity_ids,
                    title: format!("{} new {}", many.len(), collection.noun(many.len())),
                    body: lines.join("\n"),
                })
            }
        }
    }
}

impl NewItems {
    /// Renders the default notification text for these entities
    pub fn render(&self) -> Option<NewItemsNotification> {
        match self {
            NewItems::News(items) => NewItemsNotification::for_entities(items),
            NewItems::Transfers(items) => NewItemsNotification::for_entities(items),
        }
    }
}

/// Port trait for "new items" notifications
#[async_trait::async_trait]
pub trait INotifier: Send + Sync {
    /// Announces newly added entities of one collection
    async fn notify_new_items(&self, items: &NewItems) -> anyhow::Result<()>;
}
