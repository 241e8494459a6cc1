//! Integration tests for 429 / 5xx retry handling

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use matchday_remote::RemoteError;

use crate::common;

#[tokio::test]
async fn test_retries_after_too_many_requests() {
    let (server, client) = common::setup_client().await;

    Mock::given(method("GET"))
        .and(path("/news/changes"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/news/changes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let records: Vec<serde_json::Value> = client.get_json("/news/changes", &[]).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_retries_server_errors_then_succeeds() {
    let (server, client) = common::setup_client().await;

    Mock::given(method("GET"))
        .and(path("/news/changes"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/news/changes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let records: Vec<serde_json::Value> = client.get_json("/news/changes", &[]).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_too_many_requests_exhausts_retries() {
    let (server, client) = common::setup_client().await;

    Mock::given(method("GET"))
        .and(path("/news/changes"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(3)
        .mount(&server)
        .await;

    let err = client
        .get_json::<Vec<serde_json::Value>>("/news/changes", &[])
        .await
        .unwrap_err();

    match err {
        RemoteError::TooManyRequests { retry_after } => {
            assert_eq!(retry_after, Duration::ZERO)
        }
        other => panic!("expected TooManyRequests, got {other:?}"),
    }
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let (server, client) = common::setup_client().await;

    Mock::given(method("GET"))
        .and(path("/news/changes"))
        .respond_with(ResponseTemplate::new(401).set_body_string("missing api key"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client
        .get_json::<Vec<serde_json::Value>>("/news/changes", &[])
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteError::Rejected { status: 401, .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let client = matchday_remote::ApiClient::with_base_url("http://127.0.0.1:9").with_max_retries(0);

    let err = client
        .get_json::<Vec<serde_json::Value>>("/news/changes", &[])
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteError::NetworkError(_)));
}
