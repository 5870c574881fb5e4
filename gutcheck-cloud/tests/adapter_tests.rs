use gutcheck_cloud::{
    CloudConfig, CloudError, MemoryDocumentStore, ReachabilityMonitor, RemoteStoreAdapter,
    RetryPolicy, Session, StoreOp, UPDATED_AT_FIELD,
};
use gutcheck_types::{QueryBuilder, QuerySpec, SortDirection};
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};
use std::sync::Arc;

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn setup() -> (RemoteStoreAdapter, Arc<MemoryDocumentStore>) {
    let store = Arc::new(MemoryDocumentStore::new());
    let adapter = RemoteStoreAdapter::new(
        store.clone(),
        Session::signed_in("u1", "token"),
        ReachabilityMonitor::new(),
    );
    (adapter, store)
}

fn total_calls(store: &MemoryDocumentStore) -> usize {
    [StoreOp::SetMerge, StoreOp::Get, StoreOp::Query, StoreOp::Delete]
        .into_iter()
        .map(|op| store.call_count(op))
        .sum()
}

// ── Upsert ───────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_stamps_owner_and_timestamp() {
    let (adapter, store) = setup();
    adapter
        .upsert("meals", "m1", fields(json!({ "name": "Lunch" })), "u1")
        .await
        .unwrap();

    let doc = store.document("meals", "m1").unwrap();
    assert_eq!(doc["name"], "Lunch");
    assert_eq!(doc["ownerId"], "u1");
    let stamped = doc[UPDATED_AT_FIELD].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(stamped).is_ok());
}

#[tokio::test]
async fn upsert_merges_into_existing_document() {
    let (adapter, store) = setup();
    store.insert(
        "meals",
        "m1",
        fields(json!({ "name": "Lunch", "calories": 640, "ownerId": "u1" })),
    );

    adapter
        .upsert("meals", "m1", fields(json!({ "name": "Late lunch" })), "u1")
        .await
        .unwrap();

    let doc = store.document("meals", "m1").unwrap();
    assert_eq!(doc["name"], "Late lunch");
    assert_eq!(doc["calories"], 640);
}

#[tokio::test(start_paused = true)]
async fn upsert_retries_transient_failures() {
    let (adapter, store) = setup();
    store.fail_next(StoreOp::SetMerge, CloudError::Unavailable("503".into()));
    store.fail_next(StoreOp::SetMerge, CloudError::Internal("500".into()));

    adapter
        .upsert("meals", "m1", fields(json!({ "name": "Lunch" })), "u1")
        .await
        .unwrap();

    assert_eq!(store.call_count(StoreOp::SetMerge), 3);
    assert!(store.document("meals", "m1").is_some());
}

#[tokio::test(start_paused = true)]
async fn upsert_permission_denied_is_not_retried() {
    let (adapter, store) = setup();
    store.fail_next(StoreOp::SetMerge, CloudError::PermissionDenied("rules".into()));

    let err = adapter
        .upsert("meals", "m1", fields(json!({ "name": "Lunch" })), "u1")
        .await
        .unwrap_err();

    assert!(matches!(err, CloudError::PermissionDenied(_)));
    assert_eq!(store.call_count(StoreOp::SetMerge), 1);
}

#[tokio::test(start_paused = true)]
async fn upsert_exhaustion_reports_attempts() {
    let (adapter, store) = setup();
    for _ in 0..3 {
        store.fail_next(StoreOp::SetMerge, CloudError::Unavailable("503".into()));
    }

    let err = adapter
        .upsert("meals", "m1", fields(json!({ "name": "Lunch" })), "u1")
        .await
        .unwrap_err();

    assert!(matches!(err, CloudError::OperationFailed { attempts: 3, .. }));
    assert!(store.is_empty("meals"));
}

#[tokio::test(start_paused = true)]
async fn configured_policy_is_used() {
    let (adapter, store) = setup();
    let config = CloudConfig {
        retry: RetryPolicy { max_attempts: 1, base_delay_ms: 10 },
        ..CloudConfig::default()
    };
    let adapter = adapter.with_config(&config);
    store.fail_next(StoreOp::SetMerge, CloudError::Unavailable("503".into()));

    let err = adapter
        .upsert("meals", "m1", fields(json!({})), "u1")
        .await
        .unwrap_err();
    assert!(matches!(err, CloudError::OperationFailed { attempts: 1, .. }));
    assert_eq!(store.call_count(StoreOp::SetMerge), 1);
}

// ── Get / delete ─────────────────────────────────────────────────

#[tokio::test]
async fn get_missing_is_none() {
    let (adapter, _) = setup();
    assert!(adapter.get("symptoms", "s1").await.unwrap().is_none());
}

#[tokio::test]
async fn get_returns_record() {
    let (adapter, store) = setup();
    store.insert("meals", "m1", fields(json!({ "name": "Lunch", "ownerId": "u1" })));

    let record = adapter.get("meals", "m1").await.unwrap().unwrap();
    assert_eq!(record.id, "m1");
    assert_eq!(record.owner_id(), Some("u1"));
}

#[tokio::test]
async fn get_is_single_attempt() {
    let (adapter, store) = setup();
    store.fail_next(StoreOp::Get, CloudError::Unavailable("503".into()));

    let err = adapter.get("meals", "m1").await.unwrap_err();
    assert!(matches!(err, CloudError::OperationFailed { attempts: 1, .. }));
    assert_eq!(store.call_count(StoreOp::Get), 1);
}

#[tokio::test]
async fn delete_is_idempotent() {
    let (adapter, store) = setup();
    store.insert("meals", "m1", fields(json!({ "ownerId": "u1" })));

    adapter.delete("meals", "m1").await.unwrap();
    adapter.delete("meals", "m1").await.unwrap();
    assert!(store.document("meals", "m1").is_none());
}

#[tokio::test]
async fn delete_not_found_counts_as_success() {
    let (adapter, store) = setup();
    store.fail_next(StoreOp::Delete, CloudError::NotFound("gone".into()));
    adapter.delete("symptoms", "s1").await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn delete_retries_transient_failures() {
    let (adapter, store) = setup();
    store.fail_next(StoreOp::Delete, CloudError::Unavailable("503".into()));
    adapter.delete("meals", "m1").await.unwrap();
    assert_eq!(store.call_count(StoreOp::Delete), 2);
}

// ── Query ────────────────────────────────────────────────────────

#[tokio::test]
async fn query_is_scoped_to_owner() {
    let (adapter, store) = setup();
    store.insert("meals", "m1", fields(json!({ "ownerId": "u1", "name": "Lunch" })));
    store.insert("meals", "m2", fields(json!({ "ownerId": "u2", "name": "Lunch" })));
    store.insert("meals", "m3", fields(json!({ "ownerId": "u1", "name": "Dinner" })));

    let spec = QueryBuilder::new().where_eq("name", "Lunch").build();
    let records = adapter.query_by_owner("meals", "u1", &spec).await.unwrap();

    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["m1"]);
}

#[tokio::test]
async fn query_applies_ordering_and_limit() {
    let (adapter, store) = setup();
    for (id, calories) in [("m1", 300), ("m2", 900), ("m3", 600)] {
        store.insert("meals", id, fields(json!({ "ownerId": "u1", "calories": calories })));
    }

    let spec = QueryBuilder::new()
        .order_by("calories", SortDirection::Descending)
        .limit(2)
        .build();
    let records = adapter.query_by_owner("meals", "u1", &spec).await.unwrap();

    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["m2", "m3"]);
}

// ── Owner and reachability ───────────────────────────────────────

#[tokio::test]
async fn operations_without_owner_fail_before_io() {
    let store = Arc::new(MemoryDocumentStore::new());
    let adapter = RemoteStoreAdapter::new(store.clone(), Session::new(), ReachabilityMonitor::new());

    assert!(matches!(
        adapter.upsert("meals", "m1", Map::new(), "u1").await,
        Err(CloudError::NotAuthenticated)
    ));
    assert!(matches!(adapter.get("meals", "m1").await, Err(CloudError::NotAuthenticated)));
    assert!(matches!(
        adapter.query_by_owner("meals", "u1", &QuerySpec::default()).await,
        Err(CloudError::NotAuthenticated)
    ));
    assert!(matches!(adapter.delete("meals", "m1").await, Err(CloudError::NotAuthenticated)));
    assert_eq!(total_calls(&store), 0);
}

#[tokio::test]
async fn empty_owner_id_is_rejected() {
    let (adapter, store) = setup();
    assert!(matches!(
        adapter.upsert("meals", "m1", Map::new(), "").await,
        Err(CloudError::NotAuthenticated)
    ));
    assert_eq!(total_calls(&store), 0);
}

#[tokio::test]
async fn sign_out_revokes_access() {
    let (adapter, _) = setup();
    adapter.session().sign_out();
    assert!(matches!(adapter.get("meals", "m1").await, Err(CloudError::NotAuthenticated)));
}

#[tokio::test]
async fn offline_is_advisory_by_default() {
    let (adapter, store) = setup();
    adapter
        .reachability()
        .notify(gutcheck_cloud::ConnectivityEvent::Offline);

    adapter
        .upsert("meals", "m1", fields(json!({ "name": "Lunch" })), "u1")
        .await
        .unwrap();
    assert_eq!(store.call_count(StoreOp::SetMerge), 1);
}

#[tokio::test]
async fn offline_short_circuit_when_enabled() {
    let store = Arc::new(MemoryDocumentStore::new());
    let adapter = RemoteStoreAdapter::new(
        store.clone(),
        Session::signed_in("u1", "token"),
        ReachabilityMonitor::with_initial(false),
    )
    .short_circuit_when_offline(true);

    assert!(matches!(adapter.get("meals", "m1").await, Err(CloudError::Offline)));
    assert_eq!(total_calls(&store), 0);
}
