//! Epoch-offset timestamp conversion
//!
//! Hub messages carry timestamps as seconds since the Farcaster epoch
//! rather than the Unix epoch.

use chrono::{DateTime, TimeZone, Utc};

use crate::error::DecodeError;

/// Farcaster epoch: 2021-01-01T00:00:00Z, in Unix seconds.
pub const FARCASTER_EPOCH: i64 = 1_609_459_200;

/// Convert an epoch-offset timestamp to a wall-clock instant.
pub fn to_wall_clock(timestamp: u32) -> Result<DateTime<Utc>, DecodeError> {
    match Utc.timestamp_opt(FARCASTER_EPOCH + i64::from(timestamp), 0) {
        chrono::LocalResult::Single(instant) => Ok(instant),
        _ => Err(DecodeError::BadTimestamp(timestamp)),
    }
}

/// Convert an epoch-offset timestamp to Unix milliseconds.
///
/// Used for link display timestamps, which are stored as plain integers.
pub fn to_unix_millis(timestamp: u32) -> i64 {
    (FARCASTER_EPOCH + i64::from(timestamp)) * 1000
}
