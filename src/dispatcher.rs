//! Event dispatch
//!
//! Converts hub events into transactional store applications: one
//! transaction per event wrapping the upsert and the caller's merge hook,
//! then a checkpoint advance once the commit lands.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::Transaction;
use tracing::{debug, error, warn};

use crate::checkpoint::CheckpointStore;
use crate::codec::{decode, MessageRow};
use crate::error::{DecodeError, ShuttleError, ShuttleResult};
use crate::grpc::proto;
use crate::grpc::proto::hub_event::Body;
use crate::storage::{store_message, MessageStore, StoreOperation, StoreOutcome};
use crate::subscriber::HubEventObserver;

/// Caller hook invoked inside the dispatch transaction.
///
/// Runs after the row is applied, in the same transaction; raising rolls
/// the whole event back and the checkpoint does not advance, so the event
/// is redelivered on the next subscriber start.
pub trait MergeMessageHandler: Send + Sync {
    fn on_message_merge(
        &self,
        row: &MessageRow,
        tx: &Transaction,
        operation: StoreOperation,
        was_missed: bool,
    ) -> ShuttleResult<()>;
}

/// Maps hub events to store applications and advances the checkpoint.
pub struct EventDispatcher {
    store: Arc<MessageStore>,
    checkpoint: Arc<dyn CheckpointStore>,
    handler: Arc<dyn MergeMessageHandler>,
    hub_id: String,
}

impl EventDispatcher {
    pub fn new(
        store: Arc<MessageStore>,
        checkpoint: Arc<dyn CheckpointStore>,
        handler: Arc<dyn MergeMessageHandler>,
        hub_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            checkpoint,
            handler,
            hub_id: hub_id.into(),
        }
    }

    /// Decode a signed message and apply it under the given operation,
    /// invoking the merge hook in the same transaction.
    ///
    /// This is the full operation surface; the event loop itself only
    /// drives the merge arm.
    pub fn apply_message(
        &self,
        message: &proto::Message,
        operation: StoreOperation,
        was_missed: bool,
    ) -> ShuttleResult<StoreOutcome> {
        let row = decode(message)?;
        self.store.transaction(|tx| {
            let outcome = store_message(tx, &row, operation)?;
            self.handler.on_message_merge(&row, tx, operation, was_missed)?;
            Ok(outcome)
        })
    }

    /// Re-entry point for the reconciler: same transactional body as the
    /// live merge path, flagged `was_missed` for the hook. Does not touch
    /// the checkpoint.
    pub fn handle_missing(&self, message: &proto::Message) -> ShuttleResult<StoreOutcome> {
        self.apply_message(message, StoreOperation::Merge, true)
    }

    /// Process one hub event and, on success, advance the checkpoint.
    ///
    /// Only the merge-message arm is wired to the store. Prune, revoke,
    /// username-proof, and onchain events pass through with a checkpoint
    /// advance; handling them is an extension point for embedders that need
    /// those transitions driven from the stream rather than out-of-band.
    pub async fn process_event(&self, event: proto::HubEvent) -> ShuttleResult<()> {
        match &event.body {
            Some(Body::MergeMessageBody(body)) => {
                match self.apply_merge_event(body) {
                    Ok(outcome) => {
                        debug!(event_id = event.id, outcome = ?outcome, "Merged message");
                    }
                    Err(ShuttleError::Decode(e)) => {
                        // Permanent: never retried, the event is consumed.
                        warn!(event_id = event.id, error = %e, "Skipping undecodable message");
                    }
                    Err(e) => return Err(e),
                }
                self.checkpoint.save(&self.hub_id, event.id).await
            }
            Some(_) | None => {
                debug!(event_id = event.id, event_type = event.r#type, "Unhandled event arm");
                self.checkpoint.save(&self.hub_id, event.id).await
            }
        }
    }

    /// One transaction covering the merged message and any messages the
    /// hub reported as displaced by the merge.
    fn apply_merge_event(&self, body: &proto::MergeMessageBody) -> ShuttleResult<StoreOutcome> {
        let message = body.message.as_ref().ok_or(DecodeError::MissingBody)?;
        let row = decode(message)?;

        let displaced: Vec<MessageRow> = body
            .deleted_messages
            .iter()
            .filter_map(|m| match decode(m) {
                Ok(row) => Some(row),
                Err(e) => {
                    warn!(error = %e, "Skipping undecodable displaced message");
                    None
                }
            })
            .collect();

        self.store.transaction(|tx| {
            let outcome = store_message(tx, &row, StoreOperation::Merge)?;
            self.handler
                .on_message_merge(&row, tx, StoreOperation::Merge, false)?;
            for displaced_row in &displaced {
                store_message(tx, displaced_row, StoreOperation::Delete)?;
                self.handler
                    .on_message_merge(displaced_row, tx, StoreOperation::Delete, false)?;
            }
            Ok(outcome)
        })
    }
}

#[async_trait]
impl HubEventObserver for EventDispatcher {
    async fn on_event(&self, event: proto::HubEvent) -> ShuttleResult<()> {
        self.process_event(event).await
    }

    async fn on_error(&self, err: &ShuttleError, stopped: bool) {
        if stopped {
            debug!(error = %err, "Subscription ended after stop");
        } else {
            error!(error = %err, "Subscription failed");
        }
    }
}
