//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! mostly validation failures on identifiers and collection keys.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Entity or change record carried an empty identifier
    #[error("Empty entity id")]
    EmptyId,

    /// A collection key did not match any managed collection
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}
