// Worker integration test: spawn the tick loop against a fake source
// and an in-memory store, let it tick, shut down, assert the published
// payload.

mod common;

use gaugefeed::aggregator::Pipeline;
use gaugefeed::collector::SnapshotSource;
use gaugefeed::consumer::DashboardView;
use gaugefeed::models::RawSnapshot;
use gaugefeed::store::MemoryStore;
use gaugefeed::worker::{WorkerConfig, WorkerDeps, spawn};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::Duration;

/// Source returning the canned scenario snapshot every tick.
struct FixedSource {
    samples: AtomicU64,
}

impl SnapshotSource for FixedSource {
    async fn sample(&self) -> anyhow::Result<RawSnapshot> {
        self.samples.fetch_add(1, Ordering::Relaxed);
        Ok(common::sample_snapshot())
    }
}

#[tokio::test]
async fn worker_ticks_and_publishes_until_shutdown() {
    let source = Arc::new(FixedSource {
        samples: AtomicU64::new(0),
    });
    let store = Arc::new(MemoryStore::new());
    let pipeline = Arc::new(Pipeline::new());
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let handle = spawn(
        WorkerDeps {
            source: source.clone(),
            store: store.clone(),
            pipeline,
            shutdown_rx,
        },
        WorkerConfig {
            sample_interval_ms: 10,
            output_key: "gaugefeed-test-output".into(),
            stats_log_interval_secs: 60,
        },
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();

    assert!(source.samples.load(Ordering::Relaxed) >= 1);

    let view = DashboardView::fetch(store.as_ref(), "gaugefeed-test-output").await;
    assert!(!view.stale);
    assert_eq!(view.metrics.percent_memory_caching, 15.0);
    assert_eq!(view.metrics.percent_network_egress, 30.0);
    // Constant input: the rolling average stays at the sample values.
    assert_eq!(view.metrics.cpu_avg_util.get(&0), Some(&50.0));
    assert_eq!(view.metrics.cpu_avg_util.get(&1), Some(&70.0));
}
