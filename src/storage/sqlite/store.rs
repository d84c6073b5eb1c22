// File: src/storage/sqlite/store.rs

use super::config::SqliteConfig;
use super::messages::{StoreOperation, StoreOutcome, StoredMessage, StoredMessageState};
use super::{convert, messages, schema};
use crate::error::{ShuttleError, ShuttleResult, StorageError};
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Message hashes per IN-list chunk, comfortably under SQLite's bound
/// variable limit.
const HASH_CHUNK: usize = 900;

/// SQLite-backed message store
///
/// Holds the single shared connection; every write runs inside an explicit
/// transaction via [`MessageStore::transaction`].
pub struct MessageStore {
    /// Database connection (protected by mutex for thread safety)
    conn: Arc<Mutex<Connection>>,

    #[allow(dead_code)]
    config: SqliteConfig,
}

impl MessageStore {
    /// Create a new store with default configuration
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn new<P: AsRef<Path>>(path: P) -> ShuttleResult<Self> {
        let config = SqliteConfig {
            path: path.as_ref().to_string_lossy().to_string(),
            ..Default::default()
        };
        Self::with_config(config)
    }

    /// Create with custom configuration
    pub fn with_config(config: SqliteConfig) -> ShuttleResult<Self> {
        let conn = Connection::open(&config.path).map_err(|e| {
            ShuttleError::Storage(StorageError::ConnectionFailed(format!(
                "failed to open db: {}",
                e
            )))
        })?;

        Self::configure_connection(&conn, &config)?;
        schema::create_tables(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            config,
        })
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> ShuttleResult<Self> {
        let config = SqliteConfig {
            path: ":memory:".to_string(),
            wal_mode: false,
            ..Default::default()
        };
        Self::with_config(config)
    }

    /// Configure SQLite connection pragmas
    fn configure_connection(conn: &Connection, config: &SqliteConfig) -> ShuttleResult<()> {
        if config.wal_mode {
            conn.pragma_update(None, "journal_mode", "WAL")?;
        }
        conn.pragma_update(None, "busy_timeout", config.busy_timeout_ms)?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(())
    }

    fn lock_conn(&self) -> ShuttleResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            ShuttleError::Storage(StorageError::ConnectionFailed("lock poisoned".into()))
        })
    }

    /// Run a closure inside a transaction.
    ///
    /// Commits when the closure returns `Ok`; any error rolls the
    /// transaction back and propagates.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&Transaction) -> ShuttleResult<T>,
    ) -> ShuttleResult<T> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Apply a decoded row under an operation in its own transaction.
    pub fn apply(
        &self,
        row: &crate::codec::MessageRow,
        operation: StoreOperation,
    ) -> ShuttleResult<StoreOutcome> {
        self.transaction(|tx| messages::store_message(tx, row, operation))
    }

    /// Fetch lifecycle state for every stored row whose hash appears in
    /// `hashes`. Used by the reconciler to diff a hub batch.
    pub fn message_states_by_hashes(
        &self,
        hashes: &[Vec<u8>],
    ) -> ShuttleResult<Vec<StoredMessageState>> {
        let conn = self.lock_conn()?;
        let mut states = Vec::new();
        for chunk in hashes.chunks(HASH_CHUNK) {
            states.extend(messages::message_states(&conn, chunk)?);
        }
        Ok(states)
    }

    /// Look up a single message by its uniqueness key.
    pub fn get_message(
        &self,
        hash: &[u8],
        fid: u64,
        message_type: i32,
    ) -> ShuttleResult<Option<StoredMessage>> {
        let conn = self.lock_conn()?;

        let result = conn.query_row(
            "SELECT id, fid, type, timestamp, hash, hash_scheme, signature_scheme, signer,
                    body, raw, deleted_at, pruned_at, revoked_at
             FROM messages WHERE hash = ?1 AND fid = ?2 AND type = ?3",
            rusqlite::params![hash, fid as i64, message_type],
            convert::row_to_message,
        );

        match result {
            Ok(message) => Ok(Some(message)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Count of rows sharing a uniqueness key; used to assert the
    /// constraint holds.
    pub fn count_by_key(&self, hash: &[u8], fid: u64, message_type: i32) -> ShuttleResult<u64> {
        let conn = self.lock_conn()?;
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE hash = ?1 AND fid = ?2 AND type = ?3",
            rusqlite::params![hash, fid as i64, message_type],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Total message count.
    pub fn count(&self) -> ShuttleResult<u64> {
        let conn = self.lock_conn()?;
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
        Ok(count)
    }
}
