//! Startup handshake with the host and the initial roster population

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::{
    services::{HostApi, HostConfig, HostError, CAPABILITIES},
    state::AppState,
};

/// Request capabilities and start media streaming when already in a meeting
pub async fn host_handshake(host: &dyn HostApi) -> Result<HostConfig, HostError> {
    let config = host.configure(CAPABILITIES).await?;
    debug!("Host configuration: {:?}", config);

    if config.in_meeting() {
        host.start_rtms().await?;
    } else {
        info!("Host running context is {}, not starting RTMS", config.running_context);
    }

    Ok(config)
}

/// Background task run once at startup: handshake, then populate the roster.
/// A failed handshake is logged and does not stop the roster attempt.
pub async fn startup_task(state: Arc<AppState>) {
    if let Some(host) = state.host.as_deref() {
        if let Err(e) = host_handshake(host).await {
            error!("Host handshake failed: {}", e);
        }
    }

    let report = state.participant_sync().populate().await;
    info!("Roster population finished: {:?}", report.status);
    state.keep_subscription(report.subscription);
}
