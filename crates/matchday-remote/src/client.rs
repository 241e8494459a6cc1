//! Matchday API client
//!
//! Provides a typed HTTP client for the change-list API. Handles base URL
//! construction, JSON (de)serialization and retries of throttled or failed
//! requests.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use matchday_core::config::RemoteConfig;
//! use matchday_remote::client::ApiClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = ApiClient::new(&RemoteConfig::default())?;
//! let records: Vec<serde_json::Value> = client.get_json("/news/changes", &[]).await?;
//! println!("{} changes", records.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use matchday_core::config::RemoteConfig;

use crate::RemoteError;

/// Default number of retries for 429 and 5xx responses
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// First backoff delay; doubled on every further attempt
const DEFAULT_RETRY_BASE: Duration = Duration::from_secs(1);

/// Upper bound for any single backoff delay
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Longest `Retry-After` HTTP-date honoured
const MAX_RETRY_AFTER: Duration = Duration::from_secs(3600);

// ============================================================================
// ApiClient
// ============================================================================

/// HTTP client for the Matchday change-list API
///
/// Wraps `reqwest::Client` with base URL construction and retry handling.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests, without a trailing slash
    base_url: String,
    /// Retries after the first attempt for 429 and 5xx responses
    max_retries: u32,
    /// First backoff delay
    retry_base: Duration,
}

impl ApiClient {
    /// Creates a client from the `remote` section of the configuration
    ///
    /// # Errors
    /// Returns `RemoteError::NetworkError` if the HTTP client cannot be built
    /// (e.g. the TLS backend fails to initialise).
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("matchday/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            retry_base: DEFAULT_RETRY_BASE,
        })
    }

    /// Creates a client with a custom base URL (useful for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base: DEFAULT_RETRY_BASE,
        }
    }

    /// Sets the number of retries for 429 and 5xx responses
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the first backoff delay
    pub fn with_retry_base(mut self, retry_base: Duration) -> Self {
        self.retry_base = retry_base;
        self
    }

    /// Returns the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates a request builder for the given method and path
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - API path relative to the base URL (e.g. "/news/changes")
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url)
    }

    /// Backoff before retry number `attempt + 1`
    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_base
            .checked_mul(1u32 << attempt.min(16))
            .map_or(MAX_BACKOFF, |d| d.min(MAX_BACKOFF))
    }

    /// Executes a request, retrying 429 and 5xx responses
    ///
    /// On HTTP 429 the `Retry-After` header is honoured when present;
    /// otherwise, and for 5xx responses, the delay doubles on every attempt.
    /// Other non-success statuses fail immediately.
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - API path relative to base URL
    /// * `query` - Query parameters
    /// * `body` - Optional JSON body
    ///
    /// # Returns
    /// The successful response, or the last error once retries are exhausted.
    pub async fn execute_with_retry(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<Response, RemoteError> {
        let mut attempt: u32 = 0;

        loop {
            let mut request = self.request(method.clone(), path);
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await?;
            let status = response.status();

            if status.is_success() {
                if attempt > 0 {
                    info!(path, attempt, "Request succeeded after retry");
                }
                return Ok(response);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .map(|v| parse_retry_after(v, self.backoff(attempt)))
                    .unwrap_or_else(|| self.backoff(attempt));

                if attempt >= self.max_retries {
                    warn!(path, attempts = attempt + 1, "429 retry limit exhausted");
                    return Err(RemoteError::TooManyRequests { retry_after });
                }

                info!(
                    path,
                    attempt,
                    retry_after_ms = retry_after.as_millis() as u64,
                    "Received 429, backing off"
                );
                tokio::time::sleep(retry_after).await;
                attempt += 1;
                continue;
            }

            let text = response.text().await.unwrap_or_default();
            let error = RemoteError::from_status(status, path, &text);

            if status.is_server_error() && attempt < self.max_retries {
                let delay = self.backoff(attempt);
                warn!(
                    path,
                    attempt,
                    status = status.as_u16(),
                    retry_in_ms = delay.as_millis() as u64,
                    "Server error, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            return Err(error);
        }
    }

    /// Sends a GET and decodes the JSON response
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RemoteError> {
        let response = self
            .execute_with_retry(Method::GET, path, query, None)
            .await?;
        decode_json(response, path).await
    }

    /// Sends a POST with a JSON body and decodes the JSON response
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, RemoteError> {
        let response = self
            .execute_with_retry(Method::POST, path, &[], Some(body))
            .await?;
        decode_json(response, path).await
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, RemoteError> {
    let bytes = response.bytes().await?;
    debug!(path, bytes = bytes.len(), "Decoding response");
    serde_json::from_slice(&bytes)
        .map_err(|e| RemoteError::InvalidResponse(format!("{path}: {e}")))
}

/// Parses a `Retry-After` header value
///
/// Accepts delay-seconds or an HTTP-date. Falls back to `default` for
/// unparseable values and for delays longer than an hour.
pub fn parse_retry_after(value: &str, default: Duration) -> Duration {
    if let Ok(seconds) = value.trim().parse::<u64>() {
        let delay = Duration::from_secs(seconds);
        if delay <= MAX_RETRY_AFTER {
            return delay;
        }
        warn!(value, "Retry-After too long, using default");
        return default;
    }

    if let Ok(date) = chrono::DateTime::parse_from_rfc2822(value.trim()) {
        let remaining = date.with_timezone(&chrono::Utc) - chrono::Utc::now();
        if let Ok(remaining) = remaining.to_std() {
            if remaining <= MAX_RETRY_AFTER {
                return remaining;
            }
        }
    }

    warn!(value, "Could not parse Retry-After header, using default");
    default
}
