// Per-core rolling windows for the 60-sample moving average.
// Simple moving average, strict FIFO window; the state is a plain value
// the host persists between ticks (serializable for hosts that cannot
// keep memory across invocations).

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

/// Samples kept per core. One sample per tick, so 60 ticks of history.
pub const WINDOW_SIZE: usize = 60;

/// Rolling state for one metrics stream: the last <= 60 raw samples per
/// core, keyed by core index. Created empty on first use; cores absent
/// from a tick keep their window untouched, new cores start fresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RollingState {
    windows: BTreeMap<u32, VecDeque<f64>>,
}

impl RollingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes one sample for `core`, evicting the oldest past
    /// [`WINDOW_SIZE`], and returns the window average.
    ///
    /// A window found over capacity (possible only via a corrupted
    /// externalized state) violates the structural invariant; that
    /// core's window is reset to just this sample and the tick
    /// continues. Never silent: the reset is logged.
    pub fn push(&mut self, core: u32, sample: f64) -> f64 {
        let window = self.windows.entry(core).or_default();
        if window.len() > WINDOW_SIZE {
            tracing::warn!(
                core,
                len = window.len(),
                cap = WINDOW_SIZE,
                "rolling window over capacity; resetting core state"
            );
            window.clear();
        }
        window.push_back(sample);
        if window.len() > WINDOW_SIZE {
            window.pop_front();
        }
        window.iter().sum::<f64>() / window.len() as f64
    }

    /// Number of samples currently held for `core` (0 if unseen).
    pub fn window_len(&self, core: u32) -> usize {
        self.windows.get(&core).map_or(0, VecDeque::len)
    }

    /// Core indexes with at least one sample.
    pub fn cores(&self) -> impl Iterator<Item = u32> + '_ {
        self.windows.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
