use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub collector: CollectorConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    /// The single well-known key the derived metrics are published to.
    pub output_key: String,
    /// Per-operation timeout for store calls, bounds tick latency.
    #[serde(default = "default_op_timeout_ms")]
    pub op_timeout_ms: u64,
}

fn default_op_timeout_ms() -> u64 {
    2_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    /// Network interface whose byte counters feed percent_network_egress.
    pub interface: String,
    pub sample_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// How often to log app stats (ticks run, publish failures) at INFO level.
    pub stats_log_interval_secs: u64,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.store.host.is_empty(), "store.host must be non-empty");
        anyhow::ensure!(
            self.store.port > 0,
            "store.port must be between 1 and 65535, got {}",
            self.store.port
        );
        anyhow::ensure!(
            !self.store.output_key.is_empty(),
            "store.output_key must be non-empty"
        );
        anyhow::ensure!(
            self.store.op_timeout_ms > 0,
            "store.op_timeout_ms must be > 0, got {}",
            self.store.op_timeout_ms
        );
        anyhow::ensure!(
            !self.collector.interface.is_empty(),
            "collector.interface must be non-empty"
        );
        anyhow::ensure!(
            self.collector.sample_interval_ms > 0,
            "collector.sample_interval_ms must be > 0, got {}",
            self.collector.sample_interval_ms
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        Ok(())
    }
}
