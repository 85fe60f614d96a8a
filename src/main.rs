use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use gaugefeed::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let store = Arc::new(
        store::RedisStore::connect(
            &app_config.store.host,
            app_config.store.port,
            Duration::from_millis(app_config.store.op_timeout_ms),
        )
        .map_err(|e| anyhow::anyhow!("store client: {}", e))?,
    );
    let source = Arc::new(collector::SysinfoCollector::new(
        &app_config.collector.interface,
    ));
    let pipeline = Arc::new(aggregator::Pipeline::new());

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            source,
            store,
            pipeline,
            shutdown_rx,
        },
        worker::WorkerConfig {
            sample_interval_ms: app_config.collector.sample_interval_ms,
            output_key: app_config.store.output_key.clone(),
            stats_log_interval_secs: app_config.monitoring.stats_log_interval_secs,
        },
    );

    tracing::info!(
        version = version::VERSION,
        store = %format!("{}:{}", app_config.store.host, app_config.store.port),
        key = %app_config.store.output_key,
        "{} started",
        version::NAME
    );

    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable; ctrl-c only");
                tokio::signal::ctrl_c().await?;
                let _ = shutdown_tx.send(());
                let _ = worker_handle.await;
                return Ok(());
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
    }

    tracing::info!("Received shutdown signal");
    let _ = shutdown_tx.send(());
    let _ = worker_handle.await;

    Ok(())
}
