// File: src/storage/sqlite/convert.rs

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Row;

use super::messages::{StoredMessage, StoredMessageState};

/// Nullable wall-clock column → `DateTime`
pub(crate) fn nanos_to_datetime(nanos: Option<i64>) -> Option<DateTime<Utc>> {
    nanos.map(|n| Utc.timestamp_nanos(n))
}

/// `DateTime` → nullable wall-clock column
pub(crate) fn datetime_to_nanos(instant: Option<DateTime<Utc>>) -> Option<i64> {
    instant.map(|i| i.timestamp_nanos_opt().unwrap_or(0))
}

pub(crate) fn row_to_state(row: &Row) -> rusqlite::Result<StoredMessageState> {
    Ok(StoredMessageState {
        hash: row.get(0)?,
        pruned_at: nanos_to_datetime(row.get(1)?),
        revoked_at: nanos_to_datetime(row.get(2)?),
    })
}

pub(crate) fn row_to_message(row: &Row) -> rusqlite::Result<StoredMessage> {
    let body_json: String = row.get(8)?;
    let body = serde_json::from_str(&body_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(StoredMessage {
        id: row.get(0)?,
        fid: row.get::<_, i64>(1)? as u64,
        message_type: row.get(2)?,
        timestamp: Utc.timestamp_nanos(row.get(3)?),
        hash: row.get(4)?,
        hash_scheme: row.get(5)?,
        signature_scheme: row.get(6)?,
        signer: row.get(7)?,
        body,
        raw: row.get(9)?,
        deleted_at: nanos_to_datetime(row.get(10)?),
        pruned_at: nanos_to_datetime(row.get(11)?),
        revoked_at: nanos_to_datetime(row.get(12)?),
    })
}
