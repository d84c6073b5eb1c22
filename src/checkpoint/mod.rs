//! Event-id checkpoints
//!
//! Durable record of the last hub event id processed per hub identifier.
//! Saved after the transaction that persisted the event commits; a lagging
//! checkpoint only causes redelivery, which the store's upsert protocol
//! absorbs.

mod memory;
mod redis;

pub use self::memory::MemoryCheckpoint;
pub use self::redis::RedisCheckpoint;

use async_trait::async_trait;

use crate::error::ShuttleResult;

/// Checkpoint storage interface
///
/// Implementations:
/// - `RedisCheckpoint`: production backend over a Redis-style key/value store
/// - `MemoryCheckpoint`: process-local map for tests and embedding
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Last processed event id for a hub, 0 when absent.
    async fn load(&self, hub_id: &str) -> ShuttleResult<u64>;

    /// Record the last processed event id for a hub.
    async fn save(&self, hub_id: &str, event_id: u64) -> ShuttleResult<()>;

    /// Drop all checkpoints. For tests only.
    async fn clear(&self) -> ShuttleResult<()>;
}

/// Key under which a hub's checkpoint lives.
pub(crate) fn checkpoint_key(hub_id: &str) -> String {
    format!("hub:{hub_id}:last-hub-event-id")
}
