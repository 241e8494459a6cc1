//! Managed entity collections
//!
//! Each collection has its own version cursor, local table and sync pass.
//! The string key is stable: it appears in remote URLs, table names,
//! preference rows and log fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// One of the entity kinds kept in sync with the remote source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// News articles
    News,
    /// Transfer listings
    Transfers,
}

impl Collection {
    /// Every managed collection, in a stable order
    pub const ALL: [Collection; 2] = [Collection::News, Collection::Transfers];

    /// Stable key used in URLs, tables and preferences
    pub fn key(&self) -> &'static str {
        match self {
            Collection::News => "news",
            Collection::Transfers => "transfers",
        }
    }

    /// Human-readable plural noun, used when rendering notifications
    pub fn noun(&self, count: usize) -> &'static str {
        match (self, count) {
            (Collection::News, 1) => "news article",
            (Collection::News, _) => "news articles",
            (Collection::Transfers, 1) => "transfer",
            (Collection::Transfers, _) => "transfers",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Collection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "news" => Ok(Collection::News),
            "transfers" => Ok(Collection::Transfers),
            other => Err(DomainError::UnknownCollection(other.to_string())),
        }
    }
}
