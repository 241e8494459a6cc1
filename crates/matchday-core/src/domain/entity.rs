//! Synchronised entities
//!
//! Entities are immutable values identified by a stable string id. They
//! carry no user state: viewed/bookmarked flags live in the viewed-state
//! store, keyed by collection and id.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::collection::Collection;
use super::errors::DomainError;

/// Common behaviour of every synchronised entity type
///
/// The sync engine and the storage adapters are generic over this trait;
/// the associated [`Entity::COLLECTION`] ties a type to its cursor,
/// table and preferences.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Collection this entity type belongs to
    const COLLECTION: Collection;

    /// Stable identifier
    fn id(&self) -> &str;

    /// Text fed to the full-text search index
    fn search_text(&self) -> String;

    /// Title shown when this entity is announced on its own
    fn notification_title(&self) -> String;

    /// Body shown when this entity is announced on its own
    fn notification_body(&self) -> String;

    /// Wraps newly added entities of this type for the notifier
    fn into_new_items(entities: Vec<Self>) -> NewItems;

    /// Rejects entities that cannot be stored
    fn validate(&self) -> Result<(), DomainError> {
        if self.id().trim().is_empty() {
            return Err(DomainError::EmptyId);
        }
        Ok(())
    }
}

// ============================================================================
// NewsArticle
// ============================================================================

/// A news article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    /// Stable identifier
    pub id: String,
    /// Headline
    pub title: String,
    /// Article body or teaser
    pub description: String,
    /// Topic tags (clubs, competitions, ...)
    #[serde(default)]
    pub topics: Vec<String>,
    /// Optional header image
    #[serde(default)]
    pub image_url: Option<String>,
    /// Publication timestamp
    pub published_at: DateTime<Utc>,
}

impl Entity for NewsArticle {
    const COLLECTION: Collection = Collection::News;

    fn id(&self) -> &str {
        &self.id
    }

    fn search_text(&self) -> String {
        let mut text = format!("{} {}", self.title, self.description);
        for topic in &self.topics {
            text.push(' ');
            text.push_str(topic);
        }
        text
    }

    fn notification_title(&self) -> String {
        self.title.clone()
    }

    fn notification_body(&self) -> String {
        self.description.clone()
    }

    fn into_new_items(entities: Vec<Self>) -> NewItems {
        NewItems::News(entities)
    }
}

// ============================================================================
// Transfer
// ============================================================================

/// A transfer listing: a player moving between clubs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    /// Stable identifier
    pub id: String,
    /// Player name
    pub player_name: String,
    /// Club the player leaves
    pub from_club: String,
    /// Club the player joins
    pub to_club: String,
    /// Reported fee, free-form ("€25m", "Free", ...)
    #[serde(default)]
    pub price: Option<String>,
    /// Playing position
    #[serde(default)]
    pub position: Option<String>,
    /// When the transfer was announced
    pub announced_at: DateTime<Utc>,
}

impl Entity for Transfer {
    const COLLECTION: Collection = Collection::Transfers;

    fn id(&self) -> &str {
        &self.id
    }

    fn search_text(&self) -> String {
        let mut text = format!("{} {} {}", self.player_name, self.from_club, self.to_club);
        if let Some(position) = &self.position {
            text.push(' ');
            text.push_str(position);
        }
        text
    }

    fn notification_title(&self) -> String {
        format!("{} joins {}", self.player_name, self.to_club)
    }

    fn notification_body(&self) -> String {
        match &self.price {
            Some(price) => format!("From {} for {}", self.from_club, price),
            None => format!("From {}", self.from_club),
        }
    }

    fn into_new_items(entities: Vec<Self>) -> NewItems {
        NewItems::Transfers(entities)
    }
}

// ============================================================================
// NewItems
// ============================================================================

/// Newly added entities of one collection, in remote order
///
/// This is what the notifier receives: full entities, so an adapter can
/// show images, fees or anything else the payload carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewItems {
    News(Vec<NewsArticle>),
    Transfers(Vec<Transfer>),
}

impl NewItems {
    /// Collection of the announced entities
    pub fn collection(&self) -> Collection {
        match self {
            NewItems::News(_) => Collection::News,
            NewItems::Transfers(_) => Collection::Transfers,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            NewItems::News(items) => items.len(),
            NewItems::Transfers(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of the announced entities
    pub fn ids(&self) -> Vec<&str> {
        match self {
            NewItems::News(items) => items.iter().map(|e| e.id()).collect(),
            NewItems::Transfers(items) => items.iter().map(|e| e.id()).collect(),
        }
    }
}
