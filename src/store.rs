// Shared key-value store seam: single key, string value, get/set only.
// Last-write-wins, no transactions, no versioning.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use thiserror::Error;
use tokio::time::timeout;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or the operation timed out.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// The handoff store between the aggregation core and the polling
/// consumer. Implementations must treat `set` as a single atomic
/// overwrite: a reader sees the old payload or the new one, never a
/// partial write.
pub trait SharedStore: Send + Sync + 'static {
    /// Reads the value at `key`, if present.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Overwrites `key` with `value` (last-write-wins).
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Redis-backed store. The connection is established lazily on first
/// use and then pooled for the process lifetime; every operation
/// (including the initial connect) is bounded by `op_timeout` so a dead
/// store cannot stall a tick.
pub struct RedisStore {
    client: redis::Client,
    manager: tokio::sync::Mutex<Option<ConnectionManager>>,
    op_timeout: Duration,
}

impl RedisStore {
    pub fn connect(host: &str, port: u16, op_timeout: Duration) -> Result<Self, StoreError> {
        let client = redis::Client::open(format!("redis://{host}:{port}"))
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            manager: tokio::sync::Mutex::new(None),
            op_timeout,
        })
    }

    async fn manager(&self) -> Result<ConnectionManager, StoreError> {
        let mut guard = self.manager.lock().await;
        if let Some(m) = guard.as_ref() {
            return Ok(m.clone());
        }
        let m = timeout(self.op_timeout, self.client.get_connection_manager())
            .await
            .map_err(|_| {
                StoreError::Unavailable(format!("connect timed out after {:?}", self.op_timeout))
            })?
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        *guard = Some(m.clone());
        Ok(m)
    }
}

impl SharedStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.manager().await?;
        timeout(self.op_timeout, conn.get::<_, Option<String>>(key))
            .await
            .map_err(|_| {
                StoreError::Unavailable(format!("GET timed out after {:?}", self.op_timeout))
            })?
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.manager().await?;
        timeout(self.op_timeout, conn.set::<_, _, ()>(key, value))
            .await
            .map_err(|_| {
                StoreError::Unavailable(format!("SET timed out after {:?}", self.op_timeout))
            })?
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

/// In-process store for tests and store-less local runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SharedStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
