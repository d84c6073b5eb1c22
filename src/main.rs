//! hub-shuttle - replicate a hub's signed-message state into SQLite

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hub_shuttle::checkpoint::{CheckpointStore, RedisCheckpoint};
use hub_shuttle::config::HubConfig;
use hub_shuttle::dispatcher::{EventDispatcher, MergeMessageHandler};
use hub_shuttle::grpc::HubClient;
use hub_shuttle::reconciler::{MessageReconciler, ReconcileHandler};
use hub_shuttle::storage::MessageStore;
use hub_shuttle::subscriber::HubSubscriber;

#[derive(Parser, Debug)]
#[command(name = "hub-shuttle")]
#[command(about = "Replicate a hub's signed-message state into SQLite")]
struct Args {
    /// Hub gRPC endpoint
    #[arg(long, env = "SHUTTLE_HUB_URL", default_value = "http://localhost:2283")]
    hub_url: String,

    /// Path to SQLite database
    #[arg(long, env = "SHUTTLE_DATABASE_PATH", default_value = "./shuttle.db")]
    database: String,

    /// Checkpoint store URL
    #[arg(long, env = "SHUTTLE_REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    redis_url: String,

    /// Checkpoint namespace for this hub
    #[arg(long, env = "SHUTTLE_HUB_ID", default_value = "default")]
    hub_id: String,

    /// Log level
    #[arg(long, env = "SHUTTLE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Comma-separated fids to reconcile instead of streaming
    #[arg(long, env = "SHUTTLE_RECONCILE_FIDS")]
    reconcile_fids: Option<String>,
}

/// Default hook: the store write is the whole job.
struct NoopHandler;

impl MergeMessageHandler for NoopHandler {
    fn on_message_merge(
        &self,
        _row: &hub_shuttle::codec::MessageRow,
        _tx: &rusqlite::Transaction,
        _operation: hub_shuttle::storage::StoreOperation,
        _was_missed: bool,
    ) -> hub_shuttle::ShuttleResult<()> {
        Ok(())
    }
}

/// Reconcile hook that backfills missing messages through the dispatcher.
struct BackfillHandler {
    dispatcher: Arc<EventDispatcher>,
}

#[async_trait::async_trait]
impl ReconcileHandler for BackfillHandler {
    async fn on_hub_message(
        &self,
        message: &hub_shuttle::grpc::proto::Message,
        missing_in_db: bool,
        pruned_in_db: bool,
        revoked_in_db: bool,
    ) -> hub_shuttle::ShuttleResult<()> {
        if missing_in_db {
            self.dispatcher.handle_missing(message)?;
        } else if pruned_in_db || revoked_in_db {
            tracing::debug!(pruned_in_db, revoked_in_db, "Hub still serves a non-live row");
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&args.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting hub-shuttle v{}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(MessageStore::new(&args.database)?);
    tracing::info!(path = %args.database, "SQLite store ready");

    let checkpoint: Arc<dyn CheckpointStore> =
        Arc::new(RedisCheckpoint::connect(&args.redis_url).await?);

    let hub_config = HubConfig {
        url: args.hub_url.clone(),
        ..Default::default()
    };
    let client = Arc::new(HubClient::new(hub_config)?);

    let dispatcher = Arc::new(EventDispatcher::new(
        store.clone(),
        checkpoint.clone(),
        Arc::new(NoopHandler),
        args.hub_id.clone(),
    ));

    // One-shot reconciliation mode
    if let Some(fids) = &args.reconcile_fids {
        let reconciler = MessageReconciler::new(client.clone(), store.clone());
        let handler = BackfillHandler {
            dispatcher: dispatcher.clone(),
        };
        for fid in fids.split(',').filter_map(|s| s.trim().parse::<u64>().ok()) {
            if let Err(e) = reconciler.reconcile_fid(fid, &handler).await {
                tracing::error!(fid, error = %e, "Reconciliation failed, continuing");
            }
        }
        return Ok(());
    }

    // Streaming mode: restart from the last durable checkpoint on
    // transient failure, with exponential backoff.
    let subscriber = Arc::new(HubSubscriber::new(client, None));
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);
    {
        let subscriber = subscriber.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
            subscriber.destroy().await;
        });
    }

    let mut backoff_ms: u64 = 1000;
    while !*shutdown_rx.borrow() {
        let from_id = checkpoint.load(&args.hub_id).await?;
        tracing::info!(from_id, "Starting subscriber");

        match subscriber.start(Some(from_id), dispatcher.as_ref()).await {
            Ok(()) => {
                tracing::info!("Subscriber stopped, shutting down");
                break;
            }
            Err(e) if e.is_transient() => {
                tracing::error!(error = %e, backoff_ms, "Transient failure, restarting");
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_millis(backoff_ms)) => {}
                    _ = shutdown_rx.changed() => break,
                }
                backoff_ms = (backoff_ms * 2).min(60_000);
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
