//! Redis checkpoint backend

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tokio::sync::Mutex;
use tracing::debug;

use super::{checkpoint_key, CheckpointStore};
use crate::error::{ShuttleError, ShuttleResult};

/// Checkpoint store over a Redis-style key/value server.
///
/// Values are decimal strings so they stay readable from redis-cli.
pub struct RedisCheckpoint {
    conn: Mutex<MultiplexedConnection>,
}

impl RedisCheckpoint {
    /// Connect to the checkpoint store.
    pub async fn connect(url: &str) -> ShuttleResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl CheckpointStore for RedisCheckpoint {
    async fn load(&self, hub_id: &str) -> ShuttleResult<u64> {
        let mut conn = self.conn.lock().await;
        let value: Option<String> = redis::cmd("GET")
            .arg(checkpoint_key(hub_id))
            .query_async(&mut *conn)
            .await?;

        match value {
            None => Ok(0),
            Some(s) => s
                .parse()
                .map_err(|_| ShuttleError::Checkpoint(format!("non-numeric checkpoint: {s}"))),
        }
    }

    async fn save(&self, hub_id: &str, event_id: u64) -> ShuttleResult<()> {
        let mut conn = self.conn.lock().await;
        redis::cmd("SET")
            .arg(checkpoint_key(hub_id))
            .arg(event_id.to_string())
            .query_async::<_, ()>(&mut *conn)
            .await?;
        debug!(hub_id, event_id, "Checkpoint saved");
        Ok(())
    }

    async fn clear(&self) -> ShuttleResult<()> {
        let mut conn = self.conn.lock().await;
        redis::cmd("FLUSHDB")
            .query_async::<_, ()>(&mut *conn)
            .await?;
        Ok(())
    }
}
