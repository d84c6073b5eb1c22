//! Hub/store reconciliation
//!
//! Pages the hub's live inventory for a fid, one message family at a time,
//! and reports each hub message to a caller hook together with what the
//! store knows about it. The hook is awaited per message, so reconciliation
//! goes exactly as fast as the caller consumes it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::ShuttleResult;
use crate::grpc::proto::{FidRequest, Message, MessagesResponse};
use crate::grpc::HubClient;
use crate::storage::MessageStore;

/// Hub page size for inventory listings.
pub const RECONCILE_PAGE_SIZE: u32 = 3000;

/// Message families the reconciler diffs.
///
/// Only add-type messages are listed by the hub inventory RPCs; removals
/// surface indirectly as absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileKind {
    CastAdd,
    ReactionAdd,
    LinkAdd,
    VerificationAdd,
    UserDataAdd,
}

impl ReconcileKind {
    pub const ALL: [ReconcileKind; 5] = [
        ReconcileKind::CastAdd,
        ReconcileKind::ReactionAdd,
        ReconcileKind::LinkAdd,
        ReconcileKind::VerificationAdd,
        ReconcileKind::UserDataAdd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileKind::CastAdd => "cast-add",
            ReconcileKind::ReactionAdd => "reaction-add",
            ReconcileKind::LinkAdd => "link-add",
            ReconcileKind::VerificationAdd => "verification-add-address",
            ReconcileKind::UserDataAdd => "user-data-add",
        }
    }
}

/// Paged access to the hub's per-fid inventory.
///
/// Implementations:
/// - `HubClient`: the real hub RPCs
/// - test doubles that serve canned pages
#[async_trait]
pub trait MessagePager: Send + Sync {
    async fn messages_by_fid(
        &self,
        kind: ReconcileKind,
        request: FidRequest,
    ) -> ShuttleResult<MessagesResponse>;
}

#[async_trait]
impl MessagePager for HubClient {
    async fn messages_by_fid(
        &self,
        kind: ReconcileKind,
        request: FidRequest,
    ) -> ShuttleResult<MessagesResponse> {
        match kind {
            ReconcileKind::CastAdd => self.get_all_cast_messages_by_fid(request).await,
            ReconcileKind::ReactionAdd => self.get_all_reaction_messages_by_fid(request).await,
            ReconcileKind::LinkAdd => self.get_all_link_messages_by_fid(request).await,
            ReconcileKind::VerificationAdd => {
                self.get_all_verification_messages_by_fid(request).await
            }
            ReconcileKind::UserDataAdd => self.get_all_user_data_messages_by_fid(request).await,
        }
    }
}

/// Per-message reconciliation hook.
///
/// Awaited before the next message is examined; raising aborts the current
/// (fid, kind) unit.
#[async_trait]
pub trait ReconcileHandler: Send + Sync {
    async fn on_hub_message(
        &self,
        message: &Message,
        missing_in_db: bool,
        pruned_in_db: bool,
        revoked_in_db: bool,
    ) -> ShuttleResult<()>;
}

/// Diffs the hub's live inventory against the store.
///
/// The reconciler never writes; callers that want to backfill route missing
/// messages through `EventDispatcher::handle_missing`.
pub struct MessageReconciler {
    hub: Arc<dyn MessagePager>,
    store: Arc<MessageStore>,
    page_size: u32,
}

impl MessageReconciler {
    pub fn new(hub: Arc<dyn MessagePager>, store: Arc<MessageStore>) -> Self {
        Self {
            hub,
            store,
            page_size: RECONCILE_PAGE_SIZE,
        }
    }

    /// Reconcile every message family for one fid.
    pub async fn reconcile_fid(
        &self,
        fid: u64,
        handler: &dyn ReconcileHandler,
    ) -> ShuttleResult<()> {
        for kind in ReconcileKind::ALL {
            self.reconcile_messages_of_kind(fid, kind, handler).await?;
        }
        info!(fid, "Reconciled fid");
        Ok(())
    }

    /// Reconcile one (fid, kind) unit.
    ///
    /// A page fetch failure is fatal for this unit and propagates; the
    /// caller may continue with other fids.
    pub async fn reconcile_messages_of_kind(
        &self,
        fid: u64,
        kind: ReconcileKind,
        handler: &dyn ReconcileHandler,
    ) -> ShuttleResult<()> {
        let mut page_token: Option<Vec<u8>> = None;

        loop {
            let request = FidRequest {
                fid,
                page_size: Some(self.page_size),
                page_token: page_token.clone(),
                reverse: None,
            };
            let response = self.hub.messages_by_fid(kind, request).await?;

            if !response.messages.is_empty() {
                debug!(
                    fid,
                    kind = kind.as_str(),
                    batch = response.messages.len(),
                    "Reconciling batch"
                );
                self.diff_batch(&response.messages, handler).await?;
            }

            match response.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(())
    }

    async fn diff_batch(
        &self,
        messages: &[Message],
        handler: &dyn ReconcileHandler,
    ) -> ShuttleResult<()> {
        let hashes: Vec<Vec<u8>> = messages.iter().map(|m| m.hash.clone()).collect();
        let states = self.store.message_states_by_hashes(&hashes)?;
        let lookup: HashMap<&[u8], _> = states.iter().map(|s| (s.hash.as_slice(), s)).collect();

        for message in messages {
            // A deleted-but-present row reports all flags false: the hub
            // would not return a deleted message, so deletion is not a
            // reconciler signal.
            let (missing, pruned, revoked) = match lookup.get(message.hash.as_slice()) {
                None => (true, false, false),
                Some(state) => (false, state.pruned_at.is_some(), state.revoked_at.is_some()),
            };
            handler
                .on_hub_message(message, missing, pruned, revoked)
                .await?;
        }

        Ok(())
    }
}
