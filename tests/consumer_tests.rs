// Consumer contract tests: any degraded read renders the zero view.

mod common;

use common::{UnreachableStore, sample_snapshot};
use gaugefeed::aggregator::Pipeline;
use gaugefeed::consumer::DashboardView;
use gaugefeed::publisher::publish;
use gaugefeed::store::{MemoryStore, SharedStore};

const KEY: &str = "gaugefeed-test-output";

#[tokio::test]
async fn missing_key_renders_zero_state() {
    let store = MemoryStore::new();
    let view = DashboardView::fetch(&store, KEY).await;
    assert!(view.stale);
    assert_eq!(view.metrics.percent_memory_caching, 0.0);
    assert_eq!(view.metrics.percent_network_egress, 0.0);
    assert!(view.metrics.cpu_avg_util.is_empty());
}

#[tokio::test]
async fn malformed_payload_renders_zero_state() {
    let store = MemoryStore::new();
    store.set(KEY, "not json at all").await.unwrap();
    let view = DashboardView::fetch(&store, KEY).await;
    assert!(view.stale);
    assert_eq!(view.metrics, Default::default());
}

#[tokio::test]
async fn unreachable_store_renders_zero_state() {
    let view = DashboardView::fetch(&UnreachableStore, KEY).await;
    assert!(view.stale);
    assert_eq!(view.metrics, Default::default());
}

#[tokio::test]
async fn published_payload_reads_back_complete() {
    let store = MemoryStore::new();
    let pipeline = Pipeline::new();
    let metrics = pipeline.tick(&sample_snapshot());
    publish(&store, KEY, &metrics).await.unwrap();

    let view = DashboardView::fetch(&store, KEY).await;
    assert!(!view.stale);
    assert_eq!(view.metrics, metrics);
}
