//! Shuttle configuration

use crate::grpc::proto::HubEventType;

/// Top-level shuttle configuration
#[derive(Debug, Clone)]
pub struct ShuttleConfig {
    pub hub: HubConfig,
    pub database_path: String,
    pub redis_url: String,
    /// Name under which the checkpoint for this hub is stored
    pub hub_id: String,
    pub log_level: String,
}

/// Hub connection configuration
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Hub gRPC endpoint (e.g., "http://hub:2283")
    pub url: String,

    /// Budget for the transport to become ready before a subscription
    pub ready_timeout_ms: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Request timeout for unary calls in seconds
    pub request_timeout_secs: u64,

    /// Keep-alive interval in seconds
    pub keep_alive_secs: u64,

    /// Event types requested on Subscribe
    pub event_types: Vec<HubEventType>,
}

/// Event-type set used when the caller does not supply one.
pub fn default_event_types() -> Vec<HubEventType> {
    vec![
        HubEventType::MergeOnChainEvent,
        HubEventType::MergeMessage,
        HubEventType::MergeUsernameProof,
        HubEventType::PruneMessage,
        HubEventType::RevokeMessage,
    ]
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:2283".to_string(),
            ready_timeout_ms: 500,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            keep_alive_secs: 30,
            event_types: default_event_types(),
        }
    }
}

impl Default for ShuttleConfig {
    fn default() -> Self {
        Self {
            hub: HubConfig::default(),
            database_path: "./shuttle.db".to_string(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            hub_id: "default".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ShuttleConfig {
    /// Load configuration from environment variables
    ///
    /// # Environment Variables
    ///
    /// - `SHUTTLE_HUB_URL`: hub gRPC endpoint
    /// - `SHUTTLE_DATABASE_PATH`: SQLite database path
    /// - `SHUTTLE_REDIS_URL`: checkpoint store URL
    /// - `SHUTTLE_HUB_ID`: checkpoint namespace for this hub
    /// - `SHUTTLE_LOG_LEVEL`: tracing filter
    /// - `SHUTTLE_READY_TIMEOUT_MS`: transport readiness budget
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            hub: HubConfig {
                url: std::env::var("SHUTTLE_HUB_URL").unwrap_or(defaults.hub.url),
                ready_timeout_ms: std::env::var("SHUTTLE_READY_TIMEOUT_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.hub.ready_timeout_ms),
                ..defaults.hub
            },
            database_path: std::env::var("SHUTTLE_DATABASE_PATH")
                .unwrap_or(defaults.database_path),
            redis_url: std::env::var("SHUTTLE_REDIS_URL").unwrap_or(defaults.redis_url),
            hub_id: std::env::var("SHUTTLE_HUB_ID").unwrap_or(defaults.hub_id),
            log_level: std::env::var("SHUTTLE_LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }
}
