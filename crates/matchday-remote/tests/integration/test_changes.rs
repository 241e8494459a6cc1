//! Integration tests for change-list queries

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use matchday_core::domain::{ChangeRecord, Collection};
use matchday_core::ports::IRemoteChangeSource;
use matchday_remote::RemoteError;

use crate::common;

#[tokio::test]
async fn test_first_sync_omits_after_parameter() {
    let (server, source) = common::setup_source().await;

    Mock::given(method("GET"))
        .and(path("/news/changes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": "1", "version": 1, "isDelete": false },
            { "id": "2", "version": 2 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let records = source
        .fetch_changes_since(Collection::News, None)
        .await
        .expect("change list query failed");

    assert_eq!(
        records,
        vec![ChangeRecord::upsert("1", 1), ChangeRecord::upsert("2", 2)]
    );

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.query().is_none());
}

#[tokio::test]
async fn test_incremental_sync_sends_after_parameter() {
    let (server, source) = common::setup_source().await;

    Mock::given(method("GET"))
        .and(path("/transfers/changes"))
        .and(query_param("after", "41"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": "t9", "version": 42, "isDelete": true }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let records = source
        .fetch_changes_since(Collection::Transfers, Some(41))
        .await
        .unwrap();

    assert_eq!(records, vec![ChangeRecord::delete("t9", 42)]);
}

#[tokio::test]
async fn test_empty_change_list() {
    let (server, source) = common::setup_source().await;

    Mock::given(method("GET"))
        .and(path("/news/changes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let records = source
        .fetch_changes_since(Collection::News, Some(10))
        .await
        .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_malformed_change_list_is_invalid_response() {
    let (server, source) = common::setup_source().await;

    Mock::given(method("GET"))
        .and(path("/news/changes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let err = source
        .fetch_changes_since(Collection::News, None)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<RemoteError>(),
        Some(RemoteError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let (server, source) = common::setup_source().await;

    Mock::given(method("GET"))
        .and(path("/news/changes"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let err = source
        .fetch_changes_since(Collection::News, None)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<RemoteError>(),
        Some(RemoteError::NotFound(_))
    ));
    assert!(format!("{err:#}").contains("GET /news/changes failed"));
}
