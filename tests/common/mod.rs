// Shared test helpers

#![allow(dead_code)]

use gaugefeed::models::{RawSnapshot, fields};
use gaugefeed::store::{SharedStore, StoreError};

/// Two cores at 50/70, memory 1000/100/50, net 30 sent / 70 recv.
pub fn sample_snapshot() -> RawSnapshot {
    RawSnapshot::new()
        .with(fields::cpu_percent(0), 50.0)
        .with(fields::cpu_percent(1), 70.0)
        .with(fields::VIRTUAL_MEMORY_TOTAL, 1000.0)
        .with(fields::VIRTUAL_MEMORY_CACHED, 100.0)
        .with(fields::VIRTUAL_MEMORY_BUFFERS, 50.0)
        .with(fields::NET_IO_BYTES_SENT, 30.0)
        .with(fields::NET_IO_BYTES_RECV, 70.0)
}

/// Snapshot with a single core sample and nothing else.
pub fn cpu_only_snapshot(core: u32, value: f64) -> RawSnapshot {
    RawSnapshot::new().with(fields::cpu_percent(core), value)
}

/// Store whose every operation fails, for outage tests.
pub struct UnreachableStore;

impl SharedStore for UnreachableStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}
