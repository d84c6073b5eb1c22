// File: src/storage/sqlite/messages.rs

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::convert;
use crate::codec::{MessageBody, MessageRow};
use crate::error::{ShuttleError, ShuttleResult, StorageError};

/// Operation applied to an incoming row.
///
/// The operation is the only authority for lifecycle changes; no other
/// writer touches the lifecycle columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Merge,
    Delete,
    Prune,
    Revoke,
}

impl StoreOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreOperation::Merge => "merge",
            StoreOperation::Delete => "delete",
            StoreOperation::Prune => "prune",
            StoreOperation::Revoke => "revoke",
        }
    }
}

/// Logical outcome of a single upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The row is new
    Inserted,
    /// An existing row's lifecycle changed
    Updated,
    /// The row already reflects this operation
    Noop,
}

/// Lifecycle projection of a stored row, keyed by hash.
#[derive(Debug, Clone)]
pub struct StoredMessageState {
    pub hash: Vec<u8>,
    pub pruned_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// A fully materialized stored row.
#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub id: i64,
    pub fid: u64,
    pub message_type: i32,
    pub timestamp: DateTime<Utc>,
    pub hash: Vec<u8>,
    pub hash_scheme: i32,
    pub signature_scheme: i32,
    pub signer: Vec<u8>,
    pub body: MessageBody,
    pub raw: Vec<u8>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub pruned_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Upsert statement. The conflict arm rewrites the signature columns and
/// all three lifecycle columns, but only when at least one lifecycle
/// column actually changes null-ness; otherwise the update is suppressed
/// and no row comes back. `RETURNING created_at = updated_at` tells an
/// insert apart from an update.
const UPSERT_SQL: &str = "
INSERT INTO messages (fid, type, timestamp, hash, hash_scheme, signature_scheme, signer,
                      body, raw, deleted_at, pruned_at, revoked_at, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
ON CONFLICT (hash, fid, type) DO UPDATE SET
    signature_scheme = excluded.signature_scheme,
    signer = excluded.signer,
    raw = excluded.raw,
    deleted_at = excluded.deleted_at,
    pruned_at = excluded.pruned_at,
    revoked_at = excluded.revoked_at,
    updated_at = excluded.updated_at
WHERE (messages.deleted_at IS NULL) <> (excluded.deleted_at IS NULL)
   OR (messages.pruned_at IS NULL) <> (excluded.pruned_at IS NULL)
   OR (messages.revoked_at IS NULL) <> (excluded.revoked_at IS NULL)
RETURNING created_at = updated_at";

/// Apply a decoded row under an operation.
///
/// Must run inside a transaction supplied by the caller; `Transaction`
/// derefs to `Connection`, so both work here. One statement, one round
/// trip.
pub fn store_message(
    conn: &Connection,
    row: &MessageRow,
    operation: StoreOperation,
) -> ShuttleResult<StoreOutcome> {
    let now = chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0);

    let (deleted_at, pruned_at, revoked_at) = match operation {
        StoreOperation::Merge => (None, None, None),
        StoreOperation::Delete => (
            Some(now),
            convert::datetime_to_nanos(row.pruned_at),
            convert::datetime_to_nanos(row.revoked_at),
        ),
        StoreOperation::Prune => (
            convert::datetime_to_nanos(row.deleted_at),
            Some(now),
            convert::datetime_to_nanos(row.revoked_at),
        ),
        StoreOperation::Revoke => (
            convert::datetime_to_nanos(row.deleted_at),
            convert::datetime_to_nanos(row.pruned_at),
            Some(now),
        ),
    };

    let body = serde_json::to_string(&row.body)
        .map_err(|e| ShuttleError::Storage(StorageError::QueryFailed(format!("body encode: {e}"))))?;

    let result = conn.query_row(
        UPSERT_SQL,
        params![
            row.fid as i64,
            row.message_type as i32,
            row.timestamp.timestamp_nanos_opt().unwrap_or(0),
            row.hash,
            row.hash_scheme as i32,
            row.signature_scheme as i32,
            row.signer,
            body,
            row.raw,
            deleted_at,
            pruned_at,
            revoked_at,
            now,
        ],
        |r| r.get::<_, bool>(0),
    );

    match result {
        Ok(true) => Ok(StoreOutcome::Inserted),
        Ok(false) => Ok(StoreOutcome::Updated),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(StoreOutcome::Noop),
        Err(e) => Err(e.into()),
    }
}

/// Lifecycle states for the given hashes. Caller chunks the list.
pub(crate) fn message_states(
    conn: &Connection,
    hashes: &[Vec<u8>],
) -> ShuttleResult<Vec<StoredMessageState>> {
    if hashes.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; hashes.len()].join(",");
    let sql = format!(
        "SELECT hash, pruned_at, revoked_at FROM messages WHERE hash IN ({placeholders})"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        rusqlite::params_from_iter(hashes.iter()),
        convert::row_to_state,
    )?;
    rows.map(|r| r.map_err(ShuttleError::from)).collect()
}
