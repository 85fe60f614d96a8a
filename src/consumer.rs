// Read side of the shared key: what the dashboard polls.
// The dashboard is an external collaborator; this module only fixes the
// contract it relies on: a present payload is always a complete wire
// map, and any read failure degrades to a zeroed view, never a crash.

use crate::models::DerivedMetrics;
use crate::store::SharedStore;

/// Reference polling cadence (consumer-side; not enforced by the core).
pub const POLL_INTERVAL_SECS: u64 = 5;

/// One poll's worth of dashboard data. `stale` marks a degraded read
/// (missing key, unreachable store, or malformed payload); the metrics
/// are then all zeros.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardView {
    pub metrics: DerivedMetrics,
    pub stale: bool,
}

impl DashboardView {
    /// Polls `key` once. Never fails: degraded conditions produce the
    /// zero view.
    pub async fn fetch<S: SharedStore>(store: &S, key: &str) -> Self {
        match store.get(key).await {
            Ok(Some(payload)) => match serde_json::from_str::<DerivedMetrics>(&payload) {
                Ok(metrics) => Self {
                    metrics,
                    stale: false,
                },
                Err(e) => {
                    tracing::warn!(error = %e, key, "malformed payload; rendering zero state");
                    Self::degraded()
                }
            },
            Ok(None) => Self::degraded(),
            Err(e) => {
                tracing::warn!(error = %e, key, "store read failed; rendering zero state");
                Self::degraded()
            }
        }
    }

    fn degraded() -> Self {
        Self {
            metrics: DerivedMetrics::default(),
            stale: true,
        }
    }
}
