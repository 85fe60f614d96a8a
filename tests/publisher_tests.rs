// Publish step tests: wire payload shape, overwrite semantics,
// idempotence, and outage surfacing.

mod common;

use common::{UnreachableStore, sample_snapshot};
use gaugefeed::aggregator::Pipeline;
use gaugefeed::models::{DerivedMetrics, MEMORY_CACHING_KEY, NETWORK_EGRESS_KEY, cpu_avg_key};
use gaugefeed::publisher::{PublishError, publish};
use gaugefeed::store::{MemoryStore, SharedStore};
use std::collections::BTreeMap;

const KEY: &str = "gaugefeed-test-output";

fn metrics() -> DerivedMetrics {
    let pipeline = Pipeline::new();
    pipeline.tick(&sample_snapshot())
}

#[tokio::test]
async fn publish_writes_flat_numeric_map() {
    let store = MemoryStore::new();
    publish(&store, KEY, &metrics()).await.unwrap();

    let payload = store.get(KEY).await.unwrap().unwrap();
    let map: BTreeMap<String, f64> = serde_json::from_str(&payload).unwrap();
    assert_eq!(map[MEMORY_CACHING_KEY], 15.0);
    assert_eq!(map[NETWORK_EGRESS_KEY], 30.0);
    assert_eq!(map[&cpu_avg_key(0)], 50.0);
    assert_eq!(map[&cpu_avg_key(1)], 70.0);
    assert_eq!(map.len(), 4);
}

#[tokio::test]
async fn publish_is_idempotent() {
    let store = MemoryStore::new();
    let m = metrics();

    publish(&store, KEY, &m).await.unwrap();
    let first = store.get(KEY).await.unwrap();
    publish(&store, KEY, &m).await.unwrap();
    let second = store.get(KEY).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn publish_overwrites_previous_payload() {
    let store = MemoryStore::new();
    let pipeline = Pipeline::new();

    let first = pipeline.tick(&sample_snapshot());
    publish(&store, KEY, &first).await.unwrap();
    let second = pipeline.tick(&sample_snapshot());
    publish(&store, KEY, &second).await.unwrap();

    let payload = store.get(KEY).await.unwrap().unwrap();
    let read: DerivedMetrics = serde_json::from_str(&payload).unwrap();
    assert_eq!(read, second);
}

#[tokio::test]
async fn store_outage_surfaces_but_metrics_survive() {
    // The tick's aggregation result is computed before publish; an
    // unreachable store loses only the publication.
    let m = metrics();
    let err = publish(&UnreachableStore, KEY, &m).await.unwrap_err();
    assert!(matches!(err, PublishError::StoreUnavailable(_)));

    assert_eq!(m.percent_memory_caching, 15.0);
    assert_eq!(m.percent_network_egress, 30.0);
    assert_eq!(m.cpu_avg_util.len(), 2);
}

#[tokio::test]
async fn wire_payload_round_trips() {
    let m = metrics();
    let payload = serde_json::to_string(&m).unwrap();
    let read: DerivedMetrics = serde_json::from_str(&payload).unwrap();
    assert_eq!(read, m);
}
