//! Shared test helpers for remote API integration tests
//!
//! Each helper starts a mock server and returns a client pointing at it.
//! Retry delays are shortened so backoff tests stay fast.

use std::time::Duration;

use wiremock::MockServer;

use matchday_remote::{ApiClient, HttpChangeSource};

/// Starts a mock server and returns it with a change source pointing at it
pub async fn setup_source() -> (MockServer, HttpChangeSource) {
    let (server, client) = setup_client().await;
    (server, HttpChangeSource::new(client))
}

/// Starts a mock server and returns it with a client using fast retries
pub async fn setup_client() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::with_base_url(server.uri())
        .with_max_retries(2)
        .with_retry_base(Duration::from_millis(10));
    (server, client)
}

/// A news payload as served by the API
pub fn news_payload(id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": format!("Headline {id}"),
        "description": "Match report",
        "topics": ["league"],
        "imageUrl": null,
        "publishedAt": "2026-08-01T12:00:00Z"
    })
}
