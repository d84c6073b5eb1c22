//! Hub event subscription
//!
//! Maintains one resumable server-streaming subscription and hands each
//! frame to the registered observer before reading the next one, so a slow
//! consumer exerts backpressure on the stream instead of buffering.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::info;

use crate::config::default_event_types;
use crate::error::{ShuttleError, ShuttleResult};
use crate::grpc::proto::{HubEvent, HubEventType, SubscribeRequest};
use crate::grpc::HubClient;

/// Subscription lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberState {
    Idle,
    Connecting,
    Streaming,
    Stopped,
}

/// Receiver of subscription notifications.
///
/// `on_event` is awaited per frame; raising from it halts delivery and the
/// error propagates out of [`HubSubscriber::start`] untouched.
#[async_trait]
pub trait HubEventObserver: Send + Sync {
    async fn on_event(&self, event: HubEvent) -> ShuttleResult<()>;

    /// The stream closed or failed. `stopped` is true when the shutdown was
    /// requested via [`HubSubscriber::stop`].
    async fn on_error(&self, error: &ShuttleError, stopped: bool);
}

/// Resumable subscription over a caller-chosen set of hub event types.
pub struct HubSubscriber {
    client: Arc<HubClient>,
    event_types: Vec<HubEventType>,
    state: Mutex<SubscriberState>,
    shutdown: broadcast::Sender<()>,
    stop_requested: AtomicBool,
}

impl HubSubscriber {
    /// Create a subscriber. `event_types = None` selects the default set.
    pub fn new(client: Arc<HubClient>, event_types: Option<Vec<HubEventType>>) -> Self {
        let (shutdown, _) = broadcast::channel(1);
        Self {
            client,
            event_types: event_types.unwrap_or_else(default_event_types),
            state: Mutex::new(SubscriberState::Idle),
            shutdown,
            stop_requested: AtomicBool::new(false),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SubscriberState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: SubscriberState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    /// Run the subscription until the stream ends, a frame handler fails,
    /// or [`stop`](Self::stop) is called.
    ///
    /// Connecting waits at most the configured readiness budget; a hub that
    /// is not ready in time fails with `TransportUnavailable`. Events are
    /// delivered in hub-assigned order and never deduplicated; duplicates
    /// after a resume are absorbed by the store's upsert protocol.
    pub async fn start(
        &self,
        from_event_id: Option<u64>,
        observer: &dyn HubEventObserver,
    ) -> ShuttleResult<()> {
        let mut shutdown = self.shutdown.subscribe();
        self.stop_requested.store(false, Ordering::SeqCst);
        self.set_state(SubscriberState::Connecting);

        let request = SubscribeRequest {
            event_types: self.event_types.iter().map(|t| *t as i32).collect(),
            from_id: from_event_id,
        };

        let mut stream = match self.client.subscribe(request).await {
            Ok(stream) => stream,
            Err(e) => {
                self.set_state(SubscriberState::Stopped);
                observer.on_error(&e, self.stop_requested.load(Ordering::SeqCst)).await;
                return Err(e);
            }
        };

        self.set_state(SubscriberState::Streaming);
        info!(from_id = ?from_event_id, "Subscribed to hub events");

        loop {
            tokio::select! {
                frame = stream.message() => {
                    match frame {
                        Ok(Some(event)) => {
                            if let Err(e) = observer.on_event(event).await {
                                self.set_state(SubscriberState::Stopped);
                                return Err(e);
                            }
                        }
                        Ok(None) => {
                            let err = ShuttleError::StreamClosed("hub closed the stream".into());
                            self.set_state(SubscriberState::Stopped);
                            observer
                                .on_error(&err, self.stop_requested.load(Ordering::SeqCst))
                                .await;
                            return Err(err);
                        }
                        Err(status) => {
                            let err = ShuttleError::Rpc(status);
                            self.set_state(SubscriberState::Stopped);
                            observer
                                .on_error(&err, self.stop_requested.load(Ordering::SeqCst))
                                .await;
                            return Err(err);
                        }
                    }
                }
                _ = shutdown.recv() => {
                    info!("Subscriber stopped");
                    self.set_state(SubscriberState::Stopped);
                    return Ok(());
                }
            }
        }
    }

    /// Cancel the outstanding stream; frames past the one in flight are
    /// discarded.
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        if self.shutdown.send(()).is_err() {
            // No receiver: start() is not running. Terminal either way.
            self.set_state(SubscriberState::Stopped);
        }
    }

    /// Stop if needed and release the underlying transport.
    pub async fn destroy(&self) {
        self.stop();
        self.client.release().await;
        self.set_state(SubscriberState::Stopped);
    }
}
