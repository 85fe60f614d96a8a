// Raw-metrics producer: sysinfo-backed host sampling into the flat
// snapshot schema. The worker only sees the SnapshotSource seam, so
// external producers (or test fakes) can stand in for the host.

mod linux;

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use sysinfo::{MINIMUM_CPU_UPDATE_INTERVAL, Networks, System};

use crate::models::{RawSnapshot, fields};

/// One raw snapshot per tick. Implementations must not retain any
/// derived state; rolling history belongs to the aggregator.
pub trait SnapshotSource: Send + Sync + 'static {
    fn sample(&self) -> impl Future<Output = anyhow::Result<RawSnapshot>> + Send;
}

/// Host sampler: per-core CPU utilization, virtual-memory counters, and
/// cumulative byte counters for one named interface.
pub struct SysinfoCollector {
    sys: Arc<Mutex<System>>,
    networks: Arc<Mutex<Networks>>,
    interface: String,
    last_cpu_refresh: Arc<Mutex<Option<Instant>>>,
}

impl SysinfoCollector {
    pub fn new(interface: &str) -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        let networks = Networks::new_with_refreshed_list();
        Self {
            sys: Arc::new(Mutex::new(sys)),
            networks: Arc::new(Mutex::new(networks)),
            interface: interface.to_string(),
            last_cpu_refresh: Arc::new(Mutex::new(None)),
        }
    }
}

impl SnapshotSource for SysinfoCollector {
    async fn sample(&self) -> anyhow::Result<RawSnapshot> {
        let sys = self.sys.clone();
        let networks = self.networks.clone();
        let interface = self.interface.clone();
        let last_cpu_refresh = self.last_cpu_refresh.clone();
        tokio::task::spawn_blocking(move || {
            let mut snapshot = RawSnapshot::new();

            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;

            let now = Instant::now();
            let mut last = last_cpu_refresh
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            // sysinfo needs a delay between CPU refreshes for usable deltas
            let due = last.is_none_or(|prev| now.duration_since(prev) >= MINIMUM_CPU_UPDATE_INTERVAL);
            if due {
                sys.refresh_cpu_all();
                *last = Some(now);
            }
            drop(last);
            for (i, cpu) in sys.cpus().iter().enumerate() {
                snapshot.set(
                    fields::cpu_percent(i as u32),
                    (cpu.cpu_usage() as f64).clamp(0.0, 100.0),
                );
            }

            sys.refresh_memory();
            snapshot.set(fields::VIRTUAL_MEMORY_TOTAL, sys.total_memory() as f64);
            let (cached, buffers) = linux::read_meminfo_cached_buffers().unwrap_or((0, 0));
            snapshot.set(fields::VIRTUAL_MEMORY_CACHED, cached as f64);
            snapshot.set(fields::VIRTUAL_MEMORY_BUFFERS, buffers as f64);

            let mut networks = networks
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo networks lock poisoned: {}", e))?;
            networks.refresh(true);
            let (sent, recv) = networks
                .list()
                .iter()
                .find(|(name, _)| **name == interface)
                .map(|(_, data)| (data.total_transmitted(), data.total_received()))
                .unwrap_or((0, 0));
            snapshot.set(fields::NET_IO_BYTES_SENT, sent as f64);
            snapshot.set(fields::NET_IO_BYTES_RECV, recv as f64);

            Ok(snapshot)
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }
}
