//! Integration tests for batched payload fetches

use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use matchday_core::domain::{Collection, NewsArticle};
use matchday_core::ports::IRemoteChangeSource;

use crate::common;

#[tokio::test]
async fn test_batch_posts_ids_and_returns_payloads() {
    let (server, source) = common::setup_source().await;

    Mock::given(method("POST"))
        .and(path("/news/batch"))
        .and(body_json(serde_json::json!({ "ids": ["1", "2", "3"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            common::news_payload("1"),
            common::news_payload("3")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let ids = vec!["1".to_string(), "2".to_string(), "3".to_string()];
    let payloads = source
        .fetch_entities_by_ids(Collection::News, &ids)
        .await
        .expect("batch fetch failed");

    assert_eq!(payloads.len(), 2);
    let first: NewsArticle = serde_json::from_value(payloads[0].clone()).unwrap();
    assert_eq!(first.id, "1");
    assert_eq!(first.title, "Headline 1");
}

#[tokio::test]
async fn test_empty_batch_makes_no_request() {
    let (server, source) = common::setup_source().await;

    let payloads = source
        .fetch_entities_by_ids(Collection::Transfers, &[])
        .await
        .unwrap();

    assert!(payloads.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_batch_server_error_fails_after_retries() {
    let (server, source) = common::setup_source().await;

    Mock::given(method("POST"))
        .and(path("/transfers/batch"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
        .expect(3)
        .mount(&server)
        .await;

    let err = source
        .fetch_entities_by_ids(Collection::Transfers, &["t1".to_string()])
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("database down"));
}
