//! Host capability API as seen by the companion

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

/// Capabilities requested from the host during the startup handshake
pub const CAPABILITIES: &[&str] = &[
    "startRTMS",
    "stopRTMS",
    "getMeetingParticipants",
    "onParticipantChange",
    "getUserContext",
];

/// Running context the host reports when the companion is open in a live meeting
pub const IN_MEETING: &str = "inMeeting";

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("host request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("host answered {status} for {call}")]
    Status { call: &'static str, status: u16 },
    #[error("host response for {call} could not be decoded: {reason}")]
    Decode { call: &'static str, reason: String },
    #[error("host rejected {call}: {reason}")]
    Rejected { call: &'static str, reason: String },
}

/// Result of the configuration handshake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfig {
    pub running_context: String,
}

impl HostConfig {
    pub fn in_meeting(&self) -> bool {
        self.running_context == IN_MEETING
    }
}

/// The current user's standing in the meeting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub role: String,
}

impl UserContext {
    /// Hosts and co-hosts may read the roster
    pub fn can_read_roster(&self) -> bool {
        matches!(self.role.as_str(), "host" | "coHost")
    }
}

/// Calls the companion makes into the host application
#[async_trait]
pub trait HostApi: Send + Sync {
    /// Request capabilities; must succeed before other calls are meaningful
    async fn configure(&self, capabilities: &[&str]) -> Result<HostConfig, HostError>;

    /// Start real-time media streaming for the meeting
    async fn start_rtms(&self) -> Result<(), HostError>;

    async fn get_user_context(&self) -> Result<UserContext, HostError>;

    /// Raw roster response. Either an array of records or an object with a
    /// `participants` array; callers must handle both and anything else.
    async fn get_meeting_participants(&self) -> Result<Value, HostError>;

    /// Change notifications carry no payload; consumers re-fetch the roster.
    async fn subscribe_participant_changes(&self) -> Result<broadcast::Receiver<()>, HostError>;
}
