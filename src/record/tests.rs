//! Tests for record operations
//!
//! Routing tests assert the `{method, path, params}` triple each operation
//! hands the transport, against the service's documented endpoint shapes.

use super::*;
use crate::auth::AuthConfig;
use crate::error::Error;
use crate::http::mock::MockTransport;
use crate::types::FieldValue;
use pretty_assertions::assert_eq;
use serde_json::json;

fn test_client(mock: &Arc<MockTransport>) -> RecordClient {
    let config = ClientConfig::builder("https://example.cybozu.com", AuthConfig::api_token("T"))
        .build()
        .unwrap();
    RecordClient::new(Arc::clone(mock) as Arc<dyn HttpTransport>, &config)
}

fn guest_client(mock: &Arc<MockTransport>, space: u64) -> RecordClient {
    let config = ClientConfig::builder("https://example.cybozu.com", AuthConfig::api_token("T"))
        .guest_space_id(space)
        .build()
        .unwrap();
    RecordClient::new(Arc::clone(mock) as Arc<dyn HttpTransport>, &config)
}

fn sample_record() -> Record {
    let mut record = Record::new();
    record.insert("Customer".to_string(), FieldValue::from("example"));
    record
}

// ============================================================================
// Single-record operations
// ============================================================================

#[tokio::test]
async fn test_get_record_routing() {
    let mock = Arc::new(MockTransport::new());
    mock.enqueue(json!({"record": {"Customer": {"type": "SINGLE_LINE_TEXT", "value": "example"}}}));

    let record = test_client(&mock).get_record(8, 3).await.unwrap();
    assert_eq!(record["Customer"].as_str(), Some("example"));

    let log = &mock.logs()[0];
    assert_eq!(log.method, Method::GET);
    assert_eq!(log.path, "/k/v1/record.json");
    assert_eq!(log.params, json!({"app": 8, "id": 3}));
}

#[tokio::test]
async fn test_add_record_routing() {
    let mock = Arc::new(MockTransport::new());
    mock.enqueue(json!({"id": "10", "revision": "1"}));

    let stamp = test_client(&mock).add_record(8, sample_record()).await.unwrap();
    assert_eq!(stamp.id, 10);
    assert_eq!(stamp.revision, Some(1));

    let log = &mock.logs()[0];
    assert_eq!(log.method, Method::POST);
    assert_eq!(log.path, "/k/v1/record.json");
    assert_eq!(
        log.params,
        json!({"app": 8, "record": {"Customer": {"value": "example"}}})
    );
}

#[tokio::test]
async fn test_update_record_by_id_routing() {
    let mock = Arc::new(MockTransport::new());
    mock.enqueue(json!({"revision": "2"}));

    let revision = test_client(&mock)
        .update_record(8, UpdateTarget::Id(22), sample_record(), Some(1))
        .await
        .unwrap();
    assert_eq!(revision, 2);

    let log = &mock.logs()[0];
    assert_eq!(log.method, Method::PUT);
    assert_eq!(log.path, "/k/v1/record.json");
    assert_eq!(log.params["id"], 22);
    assert_eq!(log.params["revision"], 1);
}

#[tokio::test]
async fn test_update_record_by_key_routing() {
    let mock = Arc::new(MockTransport::new());
    mock.enqueue(json!({"revision": "5"}));

    test_client(&mock)
        .update_record(
            8,
            UpdateTarget::key("Code", "Case1"),
            sample_record(),
            None,
        )
        .await
        .unwrap();

    let log = &mock.logs()[0];
    assert_eq!(log.params["updateKey"], json!({"field": "Code", "value": "Case1"}));
    assert!(log.params.get("id").is_none());
    assert!(log.params.get("revision").is_none());
}

#[tokio::test]
async fn test_get_records_routing() {
    let mock = Arc::new(MockTransport::new());
    mock.enqueue(json!({"records": [], "totalCount": "0"}));

    let params = GetRecordsParams::new(8)
        .with_fields(vec!["Customer".to_string()])
        .with_query("Customer != \"foo\" limit 10")
        .with_total_count();
    let response = test_client(&mock).get_records(params).await.unwrap();
    assert_eq!(response.total_count, Some(0));

    let log = &mock.logs()[0];
    assert_eq!(log.method, Method::GET);
    assert_eq!(log.path, "/k/v1/records.json");
    assert_eq!(
        log.params,
        json!({
            "app": 8,
            "fields": ["Customer"],
            "query": "Customer != \"foo\" limit 10",
            "totalCount": true
        })
    );
}

#[tokio::test]
async fn test_guest_space_paths() {
    let mock = Arc::new(MockTransport::new());
    mock.enqueue(json!({"record": {}}));

    guest_client(&mock, 3).get_record(8, 1).await.unwrap();
    assert_eq!(mock.logs()[0].path, "/k/guest/3/v1/record.json");
}

// ============================================================================
// Bulk operations
// ============================================================================

fn add_chunk_response(ids: std::ops::Range<u64>) -> serde_json::Value {
    let ids: Vec<String> = ids.map(|id| id.to_string()).collect();
    let revisions: Vec<String> = ids.iter().map(|_| "1".to_string()).collect();
    json!({"ids": ids, "revisions": revisions})
}

#[tokio::test]
async fn test_add_records_chunks_at_the_service_limit() {
    let mock = Arc::new(MockTransport::new());
    mock.enqueue(add_chunk_response(0..100));
    mock.enqueue(add_chunk_response(100..200));
    mock.enqueue(add_chunk_response(200..250));

    let records: Vec<Record> = (0..250).map(|_| sample_record()).collect();
    let stamps = test_client(&mock).add_records(8, records).await.unwrap();

    assert_eq!(stamps.len(), 250);
    let ids: Vec<u64> = stamps.iter().map(|stamp| stamp.id).collect();
    assert_eq!(ids, (0..250).collect::<Vec<u64>>());

    let logs = mock.logs();
    assert_eq!(logs.len(), 3);
    for (log, expected_len) in logs.iter().zip([100, 100, 50]) {
        assert_eq!(log.method, Method::POST);
        assert_eq!(log.path, "/k/v1/records.json");
        assert_eq!(log.params["app"], 8);
        assert_eq!(
            log.params["records"].as_array().unwrap().len(),
            expected_len
        );
    }
}

#[tokio::test]
async fn test_add_records_empty_input_issues_no_call() {
    let mock = Arc::new(MockTransport::new());
    let stamps = test_client(&mock).add_records(8, Vec::new()).await.unwrap();
    assert!(stamps.is_empty());
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_update_records_serializes_both_targets() {
    let mock = Arc::new(MockTransport::new());
    mock.enqueue(json!({"records": [
        {"id": "8", "revision": "2"},
        {"id": "9", "revision": "3"}
    ]}));

    let updates = vec![
        RecordUpdate::by_id(8, sample_record()).with_revision(1),
        RecordUpdate::by_key("Code", "Case1", sample_record()),
    ];
    let stamps = test_client(&mock).update_records(1, updates).await.unwrap();
    assert_eq!(stamps[0].id, 8);
    assert_eq!(stamps[0].revision, Some(2));
    assert_eq!(stamps[1].id, 9);

    let log = &mock.logs()[0];
    assert_eq!(log.method, Method::PUT);
    assert_eq!(log.path, "/k/v1/records.json");
    let records = log.params["records"].as_array().unwrap();
    assert_eq!(records[0]["id"], "8");
    assert_eq!(records[0]["revision"], "1");
    assert_eq!(records[1]["updateKey"], json!({"field": "Code", "value": "Case1"}));
    assert!(records[1].get("revision").is_none());
}

#[tokio::test]
async fn test_delete_records_keeps_revisions_aligned_across_chunks() {
    let mock = Arc::new(MockTransport::new());

    let ids: Vec<u64> = (0..150).collect();
    let revisions: Vec<u64> = (0..150).map(|i| i + 1000).collect();
    test_client(&mock)
        .delete_records(8, ids, Some(revisions))
        .await
        .unwrap();

    let logs = mock.logs();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].method, Method::DELETE);
    assert_eq!(logs[0].path, "/k/v1/records.json");
    assert_eq!(logs[0].params["ids"].as_array().unwrap().len(), 100);
    assert_eq!(logs[1].params["ids"].as_array().unwrap().len(), 50);
    // The second chunk's first pair must still line up: id 100, revision 1100.
    assert_eq!(logs[1].params["ids"][0], 100);
    assert_eq!(logs[1].params["revisions"][0], 1100);
}

#[tokio::test]
async fn test_delete_records_rejects_misaligned_revisions() {
    let mock = Arc::new(MockTransport::new());
    let err = test_client(&mock)
        .delete_records(8, vec![1, 2, 3], Some(vec![1]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_delete_records_partial_failure_reports_applied_chunks() {
    let mock = Arc::new(MockTransport::new());
    mock.enqueue(json!({}));
    mock.enqueue_api_error(409, "CB_VA01", "The revision is not the latest.");

    let ids: Vec<u64> = (0..250).collect();
    let err = test_client(&mock)
        .delete_records(8, ids, None)
        .await
        .unwrap_err();

    match err {
        Error::PartialBatch(failure) => {
            assert_eq!(failure.failed_chunk, 1);
            assert_eq!(failure.applied.len(), 100);
            assert_eq!(failure.applied[0].id, 0);
            assert_eq!(failure.applied[99].id, 99);
            assert!(failure.applied.iter().all(|stamp| stamp.revision.is_none()));
            assert!(matches!(*failure.source, Error::Api(ref api) if api.status == 409));
        }
        other => panic!("expected PartialBatch, got {other:?}"),
    }

    // The third chunk was never submitted.
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test]
async fn test_delete_records_without_revisions_omits_the_field() {
    let mock = Arc::new(MockTransport::new());
    test_client(&mock)
        .delete_records(8, vec![21], None)
        .await
        .unwrap();

    let log = &mock.logs()[0];
    assert_eq!(log.params, json!({"app": 8, "ids": [21]}));
}

// ============================================================================
// Comments
// ============================================================================

#[tokio::test]
async fn test_get_comments_routing() {
    let mock = Arc::new(MockTransport::new());
    mock.enqueue(json!({"comments": [], "older": false, "newer": false}));

    let params = GetCommentsParams::new(8, 3)
        .with_order(CommentSortOrder::Desc)
        .with_offset(5)
        .with_limit(5);
    let response = test_client(&mock).get_comments(params).await.unwrap();
    assert!(response.comments.is_empty());

    let log = &mock.logs()[0];
    assert_eq!(log.method, Method::GET);
    assert_eq!(log.path, "/k/v1/record/comments.json");
    assert_eq!(
        log.params,
        json!({"app": 8, "record": 3, "order": "desc", "offset": 5, "limit": 5})
    );
}

#[tokio::test]
async fn test_add_comment_routing() {
    let mock = Arc::new(MockTransport::new());
    mock.enqueue(json!({"id": "4"}));

    let comment = CommentContent::new("Hello").mention("Administrator", "USER");
    let id = test_client(&mock).add_comment(8, 3, comment).await.unwrap();
    assert_eq!(id, 4);

    let log = &mock.logs()[0];
    assert_eq!(log.method, Method::POST);
    assert_eq!(log.path, "/k/v1/record/comment.json");
    assert_eq!(
        log.params,
        json!({
            "app": 8,
            "record": 3,
            "comment": {
                "text": "Hello",
                "mentions": [{"code": "Administrator", "type": "USER"}]
            }
        })
    );
}

#[tokio::test]
async fn test_delete_comment_routing() {
    let mock = Arc::new(MockTransport::new());
    test_client(&mock).delete_comment(8, 3, 1).await.unwrap();

    let log = &mock.logs()[0];
    assert_eq!(log.method, Method::DELETE);
    assert_eq!(log.path, "/k/v1/record/comment.json");
    assert_eq!(log.params, json!({"app": 8, "record": 3, "comment": 1}));
}

// ============================================================================
// Process management
// ============================================================================

#[tokio::test]
async fn test_update_assignees_routing() {
    let mock = Arc::new(MockTransport::new());
    mock.enqueue(json!({"revision": "3"}));

    let revision = test_client(&mock)
        .update_assignees(8, 3, vec!["user1".to_string()], None)
        .await
        .unwrap();
    assert_eq!(revision, 3);

    let log = &mock.logs()[0];
    assert_eq!(log.method, Method::PUT);
    assert_eq!(log.path, "/k/v1/record/assignees.json");
    assert_eq!(log.params, json!({"app": 8, "id": 3, "assignees": ["user1"]}));
}

#[tokio::test]
async fn test_update_status_routing() {
    let mock = Arc::new(MockTransport::new());
    mock.enqueue(json!({"revision": "6"}));

    let action = StatusAction::new(3, "action1to2").with_assignee("user1");
    let revision = test_client(&mock).update_status(8, action).await.unwrap();
    assert_eq!(revision, 6);

    let log = &mock.logs()[0];
    assert_eq!(log.method, Method::PUT);
    assert_eq!(log.path, "/k/v1/record/status.json");
    assert_eq!(
        log.params,
        json!({"app": 8, "id": 3, "action": "action1to2", "assignee": "user1"})
    );
}

#[tokio::test]
async fn test_update_statuses_routing_and_chunking() {
    let mock = Arc::new(MockTransport::new());
    mock.enqueue(json!({"records": [
        {"id": "1", "revision": "2"},
        {"id": "2", "revision": "2"}
    ]}));

    let actions = vec![
        StatusAction::new(1, "action1to2"),
        StatusAction::new(2, "action1to2"),
    ];
    let stamps = test_client(&mock).update_statuses(8, actions).await.unwrap();
    assert_eq!(stamps.len(), 2);

    let log = &mock.logs()[0];
    assert_eq!(log.method, Method::PUT);
    assert_eq!(log.path, "/k/v1/records/status.json");
    assert_eq!(
        log.params["records"],
        json!([
            {"id": "1", "action": "action1to2"},
            {"id": "2", "action": "action1to2"}
        ])
    );
}
