//! Matchday Remote - HTTP client for the change-list API
//!
//! Provides:
//! - Change-list queries per collection (`GET /{collection}/changes`)
//! - Batched payload fetches by id (`POST /{collection}/batch`)
//! - Automatic retry of 429 and 5xx responses with backoff
//!
//! ## Modules
//!
//! - [`client`] - [`ApiClient`](client::ApiClient), the retrying HTTP client
//! - [`provider`] - [`HttpChangeSource`](provider::HttpChangeSource), the `IRemoteChangeSource` adapter

pub mod client;
pub mod provider;

pub use client::ApiClient;
pub use provider::HttpChangeSource;

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the Matchday API
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request was rejected as malformed or unauthorized
    #[error("Request rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Rate limit exceeded; retry after the specified duration
    #[error("Too many requests, retry after {retry_after:?}")]
    TooManyRequests {
        /// Duration to wait before retrying
        retry_after: Duration,
    },

    /// A server-side error occurred (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    /// Maps a non-success status to an error
    pub fn from_status(status: StatusCode, path: &str, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            format!("{} {}", status, path)
        } else {
            format!("{} {}: {}", status, path, body.trim())
        };
        match status {
            StatusCode::NOT_FOUND => RemoteError::NotFound(path.to_string()),
            s if s.is_server_error() => RemoteError::ServerError(message),
            s => RemoteError::Rejected {
                status: s.as_u16(),
                message,
            },
        }
    }

    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RemoteError::TooManyRequests { .. } | RemoteError::ServerError(_)
        )
    }
}
