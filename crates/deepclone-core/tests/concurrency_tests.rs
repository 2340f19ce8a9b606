use deepclone_core::{CloneError, ClonerConfig, ReferenceGraphCloner};
use deepclone_model::RecordId;
use deepclone_test_utils::{record, store_with, ScriptedStore, StoreCall};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// `width` records that all link to each other, plus a root linking to all
fn dense_graph(width: usize) -> Vec<deepclone_model::Record> {
    let ids: Vec<String> = (0..width).map(|i| format!("n{i}")).collect();
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();

    let mut records = vec![record("root").title("Root").links("references", &refs).build()];
    records.extend(
        ids.iter()
            .map(|id| record(id).title(id).links("references", &refs).build()),
    );
    records
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_discovery_fetches_each_id_once() {
    let store = store_with(dense_graph(20));
    let scripted = Arc::new(ScriptedStore::new(store).with_latency(Duration::from_millis(5)));
    let cloner = ReferenceGraphCloner::new(scripted.clone(), ClonerConfig::default().with_max_in_flight(8)).unwrap();

    let closure = cloner.discover_references(&"root".into()).await;

    assert_eq!(closure.len(), 21);
    assert_eq!(scripted.count(|call| matches!(call, StoreCall::Get(_))), 21);
    assert_eq!(scripted.gets_of("n7"), 1);
    assert!(scripted.max_in_flight() > 1);
    assert!(scripted.max_in_flight() <= 8);
}

#[tokio::test]
async fn schema_is_fetched_once_per_content_type() {
    let store = store_with(dense_graph(10));
    let scripted = Arc::new(ScriptedStore::new(store).with_latency(Duration::from_millis(5)));
    let cloner = ReferenceGraphCloner::new(scripted.clone(), ClonerConfig::default()).unwrap();

    let all: HashSet<RecordId> = (0..10).map(|i| RecordId::new(format!("n{i}"))).collect();
    cloner.clone_entry(&"root".into(), &all).await.unwrap();

    assert_eq!(scripted.count(|call| matches!(call, StoreCall::Schema(_))), 1);
    assert_eq!(scripted.count(|call| matches!(call, StoreCall::Create(_))), 11);
    assert_eq!(cloner.progress().updated, 11);
}

#[tokio::test]
async fn cloning_respects_in_flight_limit() {
    let store = store_with(dense_graph(12));
    let scripted = Arc::new(ScriptedStore::new(store).with_latency(Duration::from_millis(5)));
    let cloner = ReferenceGraphCloner::new(scripted.clone(), ClonerConfig::default().with_max_in_flight(3)).unwrap();

    let all: HashSet<RecordId> = (0..12).map(|i| RecordId::new(format!("n{i}"))).collect();
    cloner.clone_entry(&"root".into(), &all).await.unwrap();

    assert!(scripted.max_in_flight() <= 3);
}

#[tokio::test]
async fn slow_operation_times_out() {
    let store = store_with(dense_graph(2));
    let scripted = Arc::new(ScriptedStore::new(store).with_latency(Duration::from_millis(1500)));
    let cloner = ReferenceGraphCloner::new(scripted, ClonerConfig::default().with_timeout(Duration::from_secs(1))).unwrap();

    let err = cloner.clone_entry(&"root".into(), &HashSet::new()).await.unwrap_err();

    assert!(matches!(err, CloneError::Timeout { duration_ms: 1000 }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn sub_second_timeout_leaves_room_for_fast_stores() {
    let store = store_with([record("a").title("A").build()]);
    let scripted = Arc::new(ScriptedStore::new(store).with_latency(Duration::from_millis(5)));
    let cloner = ReferenceGraphCloner::new(
        scripted.clone(),
        ClonerConfig::default().with_timeout(Duration::from_millis(500)),
    )
    .unwrap();

    let clone = cloner.clone_entry(&"a".into(), &HashSet::new()).await.unwrap();

    assert_ne!(clone.id.as_str(), "a");
    assert_eq!(cloner.progress().cloned, 1);
}

#[tokio::test]
async fn sub_second_timeout_still_fires() {
    let store = store_with(dense_graph(2));
    let scripted = Arc::new(ScriptedStore::new(store).with_latency(Duration::from_millis(400)));
    let cloner = ReferenceGraphCloner::new(
        scripted,
        ClonerConfig::default().with_timeout(Duration::from_millis(250)),
    )
    .unwrap();

    let err = cloner.clone_entry(&"root".into(), &HashSet::new()).await.unwrap_err();

    assert!(matches!(err, CloneError::Timeout { duration_ms: 250 }));
}
