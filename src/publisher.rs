// Publish step: serialize the tick's derived metrics and overwrite the
// output key in one write. No retry or backoff: a failed tick's payload
// is lost and the next tick's overwrite is the only recovery.

use thiserror::Error;

use crate::models::DerivedMetrics;
use crate::store::{SharedStore, StoreError};

#[derive(Debug, Error)]
pub enum PublishError {
    /// The shared store could not be reached or the write timed out.
    /// Always surfaced to the caller; the caller decides whether to
    /// skip the tick or abort.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("payload encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<StoreError> for PublishError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(msg) => PublishError::StoreUnavailable(msg),
        }
    }
}

/// Publishes `metrics` under `key` as the flat JSON numeric map.
///
/// The payload goes out in a single SET, so a concurrent reader always
/// sees a complete, self-consistent map (old or new, never partial).
pub async fn publish<S: SharedStore>(
    store: &S,
    key: &str,
    metrics: &DerivedMetrics,
) -> Result<(), PublishError> {
    let payload = serde_json::to_string(metrics)?;
    store.set(key, &payload).await?;
    Ok(())
}
