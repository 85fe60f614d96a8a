// Tick loop: sample the host, run the aggregation pipeline, publish.
// One tick per interval, strictly sequential; a failed stage logs and
// skips the tick instead of terminating the loop.

use std::sync::Arc;

use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::aggregator::Pipeline;
use crate::collector::SnapshotSource;
use crate::publisher;
use crate::store::SharedStore;

/// Source, store, pipeline, and shutdown for the worker.
pub struct WorkerDeps<C, S> {
    pub source: Arc<C>,
    pub store: Arc<S>,
    pub pipeline: Arc<Pipeline>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Worker timing and output config.
pub struct WorkerConfig {
    pub sample_interval_ms: u64,
    pub output_key: String,
    /// How often to log app stats (ticks run, publish failures) at INFO.
    pub stats_log_interval_secs: u64,
}

/// Spawns the tick loop. Returns a join handle.
pub fn spawn<C: SnapshotSource, S: SharedStore>(
    deps: WorkerDeps<C, S>,
    config: WorkerConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        run(deps, config).await;
    })
}

async fn run<C: SnapshotSource, S: SharedStore>(deps: WorkerDeps<C, S>, config: WorkerConfig) {
    let mut tick = interval(Duration::from_millis(config.sample_interval_ms));
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut stats_log_tick = interval(Duration::from_secs(config.stats_log_interval_secs));
    stats_log_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut shutdown_rx = deps.shutdown_rx;
    let mut ticks_total: u64 = 0;
    let mut publish_failures_total: u64 = 0;

    let worker_span = tracing::span!(
        tracing::Level::DEBUG,
        "worker",
        sample_interval_ms = config.sample_interval_ms
    );
    let _guard = worker_span.enter();

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let raw = match deps.source.sample().await {
                    Ok(r) => r,
                    Err(e) => {
                        warn!(error = %e, operation = "sample", "host sampling failed; tick skipped");
                        continue;
                    }
                };

                // Aggregation succeeds even when publish later fails;
                // only the publication is lost for that tick.
                let metrics = deps.pipeline.tick(&raw);
                ticks_total += 1;

                if let Err(e) =
                    publisher::publish(deps.store.as_ref(), &config.output_key, &metrics).await
                {
                    publish_failures_total += 1;
                    warn!(
                        error = %e,
                        operation = "publish",
                        key = %config.output_key,
                        "publish failed; next tick overwrites"
                    );
                }
            }
            _ = &mut shutdown_rx => {
                debug!("Worker shutting down");
                break;
            }
            _ = stats_log_tick.tick() => {
                info!(ticks_total, publish_failures_total, "app stats");
            }
        }
    }
}
