// Wire models: raw snapshot in, derived metrics out.
// One canonical naming scheme everywhere: underscored keys
// (cpu_percent_<i>, virtual_memory_*, net_io_*, avg_util_cpu<i>_60sec).

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::aggregator::AggregateError;

/// Canonical raw-input field names.
pub mod fields {
    /// Per-core utilization keys are `cpu_percent_<i>`, i = 0..N-1.
    pub const CPU_PERCENT_PREFIX: &str = "cpu_percent_";
    pub const VIRTUAL_MEMORY_TOTAL: &str = "virtual_memory_total";
    pub const VIRTUAL_MEMORY_CACHED: &str = "virtual_memory_cached";
    pub const VIRTUAL_MEMORY_BUFFERS: &str = "virtual_memory_buffers";
    pub const NET_IO_BYTES_SENT: &str = "net_io_bytes_sent";
    pub const NET_IO_BYTES_RECV: &str = "net_io_bytes_recv";

    pub fn cpu_percent(core: u32) -> String {
        format!("{CPU_PERCENT_PREFIX}{core}")
    }
}

/// Published output keys.
pub const MEMORY_CACHING_KEY: &str = "percent_memory_caching";
pub const NETWORK_EGRESS_KEY: &str = "percent_network_egress";
const CPU_AVG_PREFIX: &str = "avg_util_cpu";
const CPU_AVG_SUFFIX: &str = "_60sec";

/// Published key for one core's rolling average.
pub fn cpu_avg_key(core: u32) -> String {
    format!("{CPU_AVG_PREFIX}{core}{CPU_AVG_SUFFIX}")
}

/// One tick's raw host metrics: a flat name -> value map.
///
/// Extraction is tolerant by design: a missing field reads as 0 and the
/// set of `cpu_percent_<i>` keys present defines the core count for this
/// tick. Only a tick event with no metrics container at all is an error
/// (see [`RawSnapshot::from_event`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSnapshot {
    values: BTreeMap<String, f64>,
}

impl RawSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a producer tick event of the shape `{"metrics": {...}}`.
    /// Non-numeric entries are skipped; an absent (or non-object)
    /// `metrics` container is `InvalidInput`.
    pub fn from_event(event: &serde_json::Value) -> Result<Self, AggregateError> {
        let metrics = event
            .get("metrics")
            .and_then(|m| m.as_object())
            .ok_or_else(|| {
                AggregateError::InvalidInput("'metrics' key is missing from event".into())
            })?;
        let mut values = BTreeMap::new();
        for (name, value) in metrics {
            if let Some(v) = value.as_f64() {
                values.insert(name.clone(), v);
            }
        }
        Ok(Self { values })
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Builder form of [`set`](Self::set), handy in tests.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Field-by-field extraction with a 0 default for anything missing.
    pub fn get_or_zero(&self, name: &str) -> f64 {
        self.get(name).unwrap_or(0.0)
    }

    /// All `cpu_percent_<i>` samples present this tick, keyed by core
    /// index. Keys with an unparsable suffix are ignored.
    pub fn core_samples(&self) -> BTreeMap<u32, f64> {
        let mut out = BTreeMap::new();
        for (name, value) in &self.values {
            if let Some(idx) = name.strip_prefix(fields::CPU_PERCENT_PREFIX)
                && let Ok(core) = idx.parse::<u32>()
            {
                out.insert(core, *value);
            }
        }
        out
    }
}

/// Derived indicators for one tick. Produced fresh every tick, handed to
/// the publisher by value, no history retained.
///
/// Serializes to the flat numeric wire map:
/// `percent_memory_caching`, `percent_network_egress`, and one
/// `avg_util_cpu<i>_60sec` entry per core present this tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedMetrics {
    /// (cached + buffers) / total * 100, 0 when total is 0.
    pub percent_memory_caching: f64,
    /// sent / (sent + recv) * 100, 0 when both counters are 0.
    pub percent_network_egress: f64,
    /// Rolling 60-sample average per core, keyed by core index.
    pub cpu_avg_util: BTreeMap<u32, f64>,
}

impl DerivedMetrics {
    /// The flat wire map this tick publishes.
    pub fn to_wire(&self) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::new();
        map.insert(MEMORY_CACHING_KEY.to_string(), self.percent_memory_caching);
        map.insert(NETWORK_EGRESS_KEY.to_string(), self.percent_network_egress);
        for (core, avg) in &self.cpu_avg_util {
            map.insert(cpu_avg_key(*core), *avg);
        }
        map
    }

    /// Rebuilds metrics from a wire map (consumer side). Missing scalar
    /// keys read as 0; per-core entries are recognized by the
    /// `avg_util_cpu<i>_60sec` shape, anything else is ignored.
    pub fn from_wire(map: &BTreeMap<String, f64>) -> Self {
        let mut cpu_avg_util = BTreeMap::new();
        for (name, value) in map {
            if let Some(rest) = name.strip_prefix(CPU_AVG_PREFIX)
                && let Some(idx) = rest.strip_suffix(CPU_AVG_SUFFIX)
                && let Ok(core) = idx.parse::<u32>()
            {
                cpu_avg_util.insert(core, *value);
            }
        }
        Self {
            percent_memory_caching: map.get(MEMORY_CACHING_KEY).copied().unwrap_or(0.0),
            percent_network_egress: map.get(NETWORK_EGRESS_KEY).copied().unwrap_or(0.0),
            cpu_avg_util,
        }
    }
}

impl Serialize for DerivedMetrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DerivedMetrics {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<String, f64>::deserialize(deserializer)?;
        Ok(Self::from_wire(&map))
    }
}
