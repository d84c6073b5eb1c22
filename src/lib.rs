//! hub-shuttle: replication shuttle for Farcaster-style hubs
//!
//! Subscribes to a hub's event stream of signed messages, validates and
//! decodes each one, and persists it with exactly one logical outcome per
//! `(hash, fid, type)` triple. A reconciler pages the hub's per-fid
//! inventory to find what the stream missed.
//!
//! # Architecture
//!
//! ```text
//! hub ──▶ Subscriber ──▶ Dispatcher ──▶ (Codec ▶ Store)  one tx per event
//!                             │
//!                             └──▶ Checkpoint (after commit)
//!
//! Reconciler: hub inventory pages ──diff──▶ store ──▶ caller hook
//! ```
//!
//! On restart the subscriber resumes from the last durable checkpoint;
//! redelivered events collapse to no-ops in the store.

pub mod checkpoint;
pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod grpc;
pub mod reconciler;
pub mod storage;
pub mod subscriber;

// Re-exports
pub use checkpoint::{CheckpointStore, MemoryCheckpoint, RedisCheckpoint};
pub use codec::{decode, MessageBody, MessageRow};
pub use config::{HubConfig, ShuttleConfig};
pub use dispatcher::{EventDispatcher, MergeMessageHandler};
pub use error::{DecodeError, ShuttleError, ShuttleResult, StorageError};
pub use grpc::HubClient;
pub use reconciler::{MessageReconciler, ReconcileHandler, ReconcileKind};
pub use storage::{MessageStore, StoreOperation, StoreOutcome};
pub use subscriber::{HubEventObserver, HubSubscriber, SubscriberState};
