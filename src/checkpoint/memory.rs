//! In-memory checkpoint backend

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::CheckpointStore;
use crate::error::{ShuttleError, ShuttleResult};

/// Process-local checkpoint map.
///
/// Not durable; used by tests and by embedders that track resumption
/// themselves.
#[derive(Default)]
pub struct MemoryCheckpoint {
    entries: Mutex<HashMap<String, u64>>,
}

impl MemoryCheckpoint {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpoint {
    async fn load(&self, hub_id: &str) -> ShuttleResult<u64> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| ShuttleError::Checkpoint("lock poisoned".into()))?;
        Ok(entries.get(hub_id).copied().unwrap_or(0))
    }

    async fn save(&self, hub_id: &str, event_id: u64) -> ShuttleResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ShuttleError::Checkpoint("lock poisoned".into()))?;
        entries.insert(hub_id.to_string(), event_id);
        Ok(())
    }

    async fn clear(&self) -> ShuttleResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ShuttleError::Checkpoint("lock poisoned".into()))?;
        entries.clear();
        Ok(())
    }
}
