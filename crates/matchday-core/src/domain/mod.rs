//! Domain entities and business logic
//!
//! This module contains the core domain types for Matchday:
//! - Managed collections and remote change records
//! - The composite version cursor
//! - News and transfer entities
//! - Domain-specific error types

pub mod change;
pub mod collection;
pub mod entity;
pub mod errors;
pub mod versions;

// Re-export commonly used types
pub use change::{ChangeRecord, ChangeSet};
pub use collection::Collection;
pub use entity::{Entity, NewItems, NewsArticle, Transfer};
pub use errors::DomainError;
pub use versions::SyncVersions;
