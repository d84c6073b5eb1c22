// File: src/storage/sqlite/schema.rs

use crate::error::ShuttleResult;
use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Create all tables (idempotent)
pub fn create_tables(conn: &Connection) -> ShuttleResult<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    let now = chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0);
    conn.execute(
        "INSERT OR REPLACE INTO shuttle_config (key, value, updated_at) VALUES ('schema_version', ?1, ?2)",
        rusqlite::params![SCHEMA_VERSION.to_string(), now],
    )?;

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Core configuration
CREATE TABLE IF NOT EXISTS shuttle_config (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);

-- Replicated hub messages
CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    fid INTEGER NOT NULL,                   -- User id
    type INTEGER NOT NULL,                  -- Message type enum
    timestamp INTEGER NOT NULL,             -- Wall clock, Unix nanoseconds
    hash BLOB NOT NULL,                     -- Truncated content hash
    hash_scheme INTEGER NOT NULL,
    signature_scheme INTEGER NOT NULL,
    signer BLOB NOT NULL,                   -- Signer public key
    body TEXT NOT NULL,                     -- Decoded body, JSON
    raw BLOB NOT NULL,                      -- Full serialized signed message
    deleted_at INTEGER,                     -- Lifecycle flags, Unix nanoseconds
    pruned_at INTEGER,
    revoked_at INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    UNIQUE (hash, fid, type)
);

-- Indices for reconciliation and operational queries
CREATE INDEX IF NOT EXISTS idx_messages_hash ON messages(hash);
CREATE INDEX IF NOT EXISTS idx_messages_fid_type ON messages(fid, type);
CREATE INDEX IF NOT EXISTS idx_messages_timestamp ON messages(timestamp);
"#;
