//! Hub gRPC client
//!
//! Wraps the generated `HubServiceClient` with lazy connection management.
//! The transport is established on first use, bounded by the readiness
//! budget, and can be released so a later call reconnects from scratch.

use std::time::Duration;

use tokio::sync::Mutex;
use tonic::transport::{Channel, Endpoint};
use tracing::info;

use crate::config::HubConfig;
use crate::error::{ShuttleError, ShuttleResult};
use crate::grpc::proto::hub_service_client::HubServiceClient;
use crate::grpc::proto::{FidRequest, HubEvent, MessagesResponse, SubscribeRequest};

/// Client for the hub RPC surface the shuttle consumes
pub struct HubClient {
    endpoint: Endpoint,
    config: HubConfig,
    channel: Mutex<Option<Channel>>,
}

impl HubClient {
    /// Create a new client; no connection is made until first use.
    pub fn new(config: HubConfig) -> ShuttleResult<Self> {
        let endpoint = Endpoint::from_shared(config.url.clone())
            .map_err(|e| ShuttleError::Config(format!("invalid hub URL: {e}")))?
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .http2_keep_alive_interval(Duration::from_secs(config.keep_alive_secs))
            .keep_alive_timeout(Duration::from_secs(config.keep_alive_secs))
            .keep_alive_while_idle(true);

        Ok(Self {
            endpoint,
            config,
            channel: Mutex::new(None),
        })
    }

    /// Get the transport, connecting within the readiness budget if needed.
    ///
    /// # Errors
    ///
    /// `TransportUnavailable` when the hub cannot be reached before the
    /// budget elapses.
    pub async fn channel(&self) -> ShuttleResult<Channel> {
        let mut guard = self.channel.lock().await;
        if let Some(channel) = guard.as_ref() {
            return Ok(channel.clone());
        }

        let budget = Duration::from_millis(self.config.ready_timeout_ms);
        let channel = tokio::time::timeout(budget, self.endpoint.connect())
            .await
            .map_err(|_| {
                ShuttleError::TransportUnavailable(format!(
                    "hub not ready within {}ms",
                    self.config.ready_timeout_ms
                ))
            })?
            .map_err(|e| ShuttleError::TransportUnavailable(e.to_string()))?;

        info!(url = %self.config.url, "Connected to hub");
        *guard = Some(channel.clone());
        Ok(channel)
    }

    /// Drop the cached transport; the next call reconnects.
    pub async fn release(&self) {
        *self.channel.lock().await = None;
    }

    /// Open the event stream, optionally resuming from a prior event id.
    pub async fn subscribe(
        &self,
        request: SubscribeRequest,
    ) -> ShuttleResult<tonic::Streaming<HubEvent>> {
        let mut client = HubServiceClient::new(self.channel().await?);
        let stream = client.subscribe(request).await?.into_inner();
        Ok(stream)
    }

    // ========== Paged inventory calls (reconciliation) ==========

    pub async fn get_all_cast_messages_by_fid(
        &self,
        request: FidRequest,
    ) -> ShuttleResult<MessagesResponse> {
        let mut client = HubServiceClient::new(self.channel().await?);
        Ok(client
            .get_all_cast_messages_by_fid(request)
            .await?
            .into_inner())
    }

    pub async fn get_all_reaction_messages_by_fid(
        &self,
        request: FidRequest,
    ) -> ShuttleResult<MessagesResponse> {
        let mut client = HubServiceClient::new(self.channel().await?);
        Ok(client
            .get_all_reaction_messages_by_fid(request)
            .await?
            .into_inner())
    }

    pub async fn get_all_link_messages_by_fid(
        &self,
        request: FidRequest,
    ) -> ShuttleResult<MessagesResponse> {
        let mut client = HubServiceClient::new(self.channel().await?);
        Ok(client
            .get_all_link_messages_by_fid(request)
            .await?
            .into_inner())
    }

    pub async fn get_all_verification_messages_by_fid(
        &self,
        request: FidRequest,
    ) -> ShuttleResult<MessagesResponse> {
        let mut client = HubServiceClient::new(self.channel().await?);
        Ok(client
            .get_all_verification_messages_by_fid(request)
            .await?
            .into_inner())
    }

    pub async fn get_all_user_data_messages_by_fid(
        &self,
        request: FidRequest,
    ) -> ShuttleResult<MessagesResponse> {
        let mut client = HubServiceClient::new(self.channel().await?);
        Ok(client
            .get_all_user_data_messages_by_fid(request)
            .await?
            .into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_url() {
        let config = HubConfig {
            url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            HubClient::new(config),
            Err(ShuttleError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_channel_times_out_against_unreachable_hub() {
        // Reserved TEST-NET-1 address; nothing listens there.
        let config = HubConfig {
            url: "http://192.0.2.1:2283".to_string(),
            ready_timeout_ms: 50,
            ..Default::default()
        };
        let client = HubClient::new(config).unwrap();
        let err = client.channel().await.unwrap_err();
        assert!(matches!(err, ShuttleError::TransportUnavailable(_)));
        assert!(err.is_transient());
    }
}
