//! Shuttle error types

use thiserror::Error;

/// Main shuttle error type
#[derive(Debug, Error)]
pub enum ShuttleError {
    // ========== Per-event (permanent) ==========
    /// Message failed validation or decoding; never retried
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    // ========== Transport (transient) ==========
    /// Hub transport did not become ready within the readiness budget
    #[error("hub transport unavailable: {0}")]
    TransportUnavailable(String),

    /// The event stream closed or failed mid-subscription
    #[error("hub stream closed: {0}")]
    StreamClosed(String),

    /// gRPC request failed
    #[error("hub rpc error: {0}")]
    Rpc(#[from] tonic::Status),

    // ========== Storage ==========
    /// Storage operation failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    // ========== Checkpoint ==========
    /// Checkpoint store unreachable or returned garbage
    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    // ========== Handler ==========
    /// The caller's merge hook raised inside a dispatch transaction
    #[error("handler error: {0}")]
    Handler(String),

    // ========== Structural ==========
    /// Misconfiguration detected at startup
    #[error("configuration error: {0}")]
    Config(String),
}

/// Codec failures. All permanent: log, skip, advance.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Hash or signature verification failed
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// The signed envelope carries no data section
    #[error("message has no body")]
    MissingBody,

    /// Message type is not one the shuttle persists
    #[error("unknown message type: {0}")]
    UnknownType(i32),

    /// Body variant does not match the declared message type
    #[error("body does not match message type {0}")]
    BodyMismatch(i32),

    /// Epoch-offset timestamp does not map to a wall-clock instant
    #[error("bad timestamp: {0}")]
    BadTimestamp(u32),
}

/// Storage-specific errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database connection failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// Schema creation or migration failed
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite database error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Shuttle result type alias
pub type ShuttleResult<T> = Result<T, ShuttleError>;

impl ShuttleError {
    /// Whether the caller should retry by restarting the failed component.
    ///
    /// Transient errors come from the hub transport, the store connection,
    /// or the checkpoint store; restarting from the last durable checkpoint
    /// is safe because the upsert protocol absorbs redelivery. Everything
    /// else is either permanent (skip the event) or structural (fix and
    /// redeploy).
    pub fn is_transient(&self) -> bool {
        match self {
            ShuttleError::TransportUnavailable(_)
            | ShuttleError::StreamClosed(_)
            | ShuttleError::Checkpoint(_) => true,
            ShuttleError::Rpc(status) => matches!(
                status.code(),
                tonic::Code::Unavailable | tonic::Code::DeadlineExceeded | tonic::Code::Aborted
            ),
            ShuttleError::Storage(StorageError::ConnectionFailed(_)) => true,
            _ => false,
        }
    }
}

impl From<redis::RedisError> for ShuttleError {
    fn from(e: redis::RedisError) -> Self {
        ShuttleError::Checkpoint(e.to_string())
    }
}

impl From<rusqlite::Error> for ShuttleError {
    fn from(e: rusqlite::Error) -> Self {
        ShuttleError::Storage(StorageError::Sqlite(e))
    }
}
