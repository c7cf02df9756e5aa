//! Host bridge reached over HTTP

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::host::{HostApi, HostConfig, HostError, UserContext};

/// Host API backed by a bridge process exposing the host SDK over HTTP.
///
/// Roster change notifications are pushed by the bridge to this server and
/// fanned out through [`HttpHost::notify_participant_change`].
#[derive(Debug)]
pub struct HttpHost {
    client: reqwest::Client,
    base_url: String,
    change_tx: broadcast::Sender<()>,
}

impl HttpHost {
    pub fn new(base_url: &str) -> Result<Self, HostError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("toastmaster-companion/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let (change_tx, _) = broadcast::channel(16);

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            change_tx,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Forward a change notification from the bridge to every subscriber.
    /// Returns the number of listeners reached.
    pub fn notify_participant_change(&self) -> usize {
        match self.change_tx.send(()) {
            Ok(listeners) => {
                debug!("Participant change delivered to {} listener(s)", listeners);
                listeners
            }
            Err(_) => {
                warn!("Participant change received but nobody is subscribed");
                0
            }
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(
        call: &'static str,
        response: reqwest::Response,
    ) -> Result<T, HostError> {
        let status = response.status();
        if !status.is_success() {
            return Err(HostError::Status {
                call,
                status: status.as_u16(),
            });
        }
        response.json::<T>().await.map_err(|e| HostError::Decode {
            call,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl HostApi for HttpHost {
    async fn configure(&self, capabilities: &[&str]) -> Result<HostConfig, HostError> {
        debug!("Configuring host at {} with {:?}", self.base_url, capabilities);
        let response = self
            .client
            .post(self.url("config"))
            .json(&json!({ "capabilities": capabilities }))
            .send()
            .await?;
        Self::decode("config", response).await
    }

    async fn start_rtms(&self) -> Result<(), HostError> {
        let response = self.client.post(self.url("rtms/start")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HostError::Status {
                call: "startRTMS",
                status: status.as_u16(),
            });
        }
        info!("Real-time media streaming started");
        Ok(())
    }

    async fn get_user_context(&self) -> Result<UserContext, HostError> {
        let response = self.client.get(self.url("user-context")).send().await?;
        Self::decode("getUserContext", response).await
    }

    async fn get_meeting_participants(&self) -> Result<Value, HostError> {
        let response = self.client.get(self.url("participants")).send().await?;
        Self::decode("getMeetingParticipants", response).await
    }

    async fn subscribe_participant_changes(&self) -> Result<broadcast::Receiver<()>, HostError> {
        Ok(self.change_tx.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let host = HttpHost::new("http://127.0.0.1:9000/bridge/").unwrap();
        assert_eq!(host.base_url(), "http://127.0.0.1:9000/bridge");
        assert_eq!(host.url("participants"), "http://127.0.0.1:9000/bridge/participants");
    }

    #[tokio::test]
    async fn change_notifications_reach_subscribers() {
        let host = HttpHost::new("http://127.0.0.1:9000").unwrap();
        assert_eq!(host.notify_participant_change(), 0);

        let mut rx = host.subscribe_participant_changes().await.unwrap();
        assert_eq!(host.notify_participant_change(), 1);
        assert!(rx.recv().await.is_ok());
    }
}
