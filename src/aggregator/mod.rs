// Streaming aggregation core: (raw snapshot, rolling state) -> derived
// metrics. Pure and deterministic; all I/O lives in collector/publisher.

pub mod rolling;

pub use rolling::{RollingState, WINDOW_SIZE};

use std::collections::BTreeMap;
use std::sync::Mutex;

use thiserror::Error;

use crate::models::{DerivedMetrics, RawSnapshot, fields};

#[derive(Debug, Error)]
pub enum AggregateError {
    /// The tick event carried no metrics container at all. Individual
    /// missing fields are tolerated and read as 0; this fires only when
    /// there is nothing to aggregate from. Local to one tick.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Runs one tick of aggregation. Updates `state` in place and returns
/// the tick's derived metrics.
///
/// Arithmetic edge cases are absorbed, never surfaced: a zero memory
/// total or zero byte counters degrade the corresponding percentage to
/// 0, and an empty core set yields an empty CPU section.
pub fn aggregate(raw: &RawSnapshot, state: &mut RollingState) -> DerivedMetrics {
    let mut cpu_avg_util = BTreeMap::new();
    for (core, sample) in raw.core_samples() {
        cpu_avg_util.insert(core, state.push(core, sample));
    }

    let total = raw.get_or_zero(fields::VIRTUAL_MEMORY_TOTAL);
    let cached = raw.get_or_zero(fields::VIRTUAL_MEMORY_CACHED);
    let buffers = raw.get_or_zero(fields::VIRTUAL_MEMORY_BUFFERS);
    let percent_memory_caching = if total > 0.0 {
        (cached + buffers) / total * 100.0
    } else {
        0.0
    };

    let sent = raw.get_or_zero(fields::NET_IO_BYTES_SENT);
    let recv = raw.get_or_zero(fields::NET_IO_BYTES_RECV);
    let total_bytes = sent + recv;
    let percent_network_egress = if total_bytes > 0.0 {
        sent / total_bytes * 100.0
    } else {
        0.0
    };

    DerivedMetrics {
        percent_memory_caching,
        percent_network_egress,
        cpu_avg_util,
    }
}

/// One logical metrics stream: the rolling state plus the lock that
/// serializes overlapping tick invocations against it. Each stream owns
/// exactly one state; no cross-stream locking exists.
#[derive(Debug, Default)]
pub struct Pipeline {
    state: Mutex<RollingState>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes a stream from externalized state (short-lived hosts).
    pub fn with_state(state: RollingState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Runs one tick against this stream's state.
    pub fn tick(&self, raw: &RawSnapshot) -> DerivedMetrics {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        aggregate(raw, &mut state)
    }

    /// Runs one tick from a producer tick event (`{"metrics": {...}}`).
    pub fn tick_event(&self, event: &serde_json::Value) -> Result<DerivedMetrics, AggregateError> {
        let raw = RawSnapshot::from_event(event)?;
        Ok(self.tick(&raw))
    }

    /// Copy of the current rolling state, for hosts that persist it
    /// between invocations.
    pub fn export_state(&self) -> RollingState {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
