//! Automatic roster population from the host meeting

use std::sync::Arc;

use tokio::{
    sync::broadcast::{self, error::RecvError, error::TryRecvError},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use crate::{
    services::{HostApi, HostError},
    state::{parse_participants, Roster, SyncStatus},
};

/// Live roster subscription. Dropping it stops listening for changes.
#[derive(Debug)]
pub struct Subscription {
    listener: JoinHandle<()>,
}

impl Subscription {
    pub fn cancel(self) {
        // Drop aborts the listener
    }

    pub fn is_active(&self) -> bool {
        !self.listener.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

/// What a population attempt produced
#[derive(Debug)]
pub struct SyncReport {
    pub status: SyncStatus,
    pub subscription: Option<Subscription>,
}

/// Fills the roster from the host and keeps it current
#[derive(Clone)]
pub struct ParticipantSync {
    host: Option<Arc<dyn HostApi>>,
    roster: Roster,
}

impl ParticipantSync {
    pub fn new(host: Option<Arc<dyn HostApi>>, roster: Roster) -> Self {
        Self { host, roster }
    }

    /// Run a single population attempt. Never fails: every outcome is
    /// written to the roster status line and returned in the report.
    pub async fn populate(&self) -> SyncReport {
        let Some(host) = self.host.clone() else {
            info!("Host integration not available, manual entry only");
            return self.finish(SyncStatus::HostUnavailable, None);
        };

        match self.try_populate(host).await {
            Ok(Some(subscription)) => {
                info!("Participant list auto-populated from host");
                self.finish(SyncStatus::AutoPopulated, Some(subscription))
            }
            Ok(None) => self.finish(SyncStatus::InsufficientPrivilege, None),
            Err(e) => {
                error!("Error getting meeting participants: {}", e);
                self.finish(SyncStatus::Failed, None)
            }
        }
    }

    fn finish(&self, status: SyncStatus, subscription: Option<Subscription>) -> SyncReport {
        self.roster.set_status(status);
        SyncReport {
            status,
            subscription,
        }
    }

    async fn try_populate(&self, host: Arc<dyn HostApi>) -> Result<Option<Subscription>, HostError> {
        let context = host.get_user_context().await?;
        debug!("Host user context: {:?}", context);
        if !context.can_read_roster() {
            info!("Role {} cannot read the roster", context.role);
            return Ok(None);
        }

        refresh_roster(host.as_ref(), &self.roster).await?;

        let changes = host.subscribe_participant_changes().await?;
        let listener = tokio::spawn(listen_for_changes(host, self.roster.clone(), changes));
        Ok(Some(Subscription { listener }))
    }
}

/// Fetch the roster and replace the visible list with it
async fn refresh_roster(host: &dyn HostApi, roster: &Roster) -> Result<(), HostError> {
    let response = host.get_meeting_participants().await?;
    debug!("Host meeting participants: {}", response);
    match parse_participants(&response) {
        Some(entries) => roster.replace_all(entries),
        None => debug!("Participant response had no usable list, leaving roster untouched"),
    }
    Ok(())
}

/// Re-fetch on every change notification.
///
/// Notifications are handled one at a time, so a refetch never overlaps
/// another; anything that queued up meanwhile collapses into one refetch.
async fn listen_for_changes(
    host: Arc<dyn HostApi>,
    roster: Roster,
    mut changes: broadcast::Receiver<()>,
) {
    loop {
        match changes.recv().await {
            Ok(()) => {}
            Err(RecvError::Lagged(missed)) => debug!("Collapsed {} missed participant changes", missed),
            Err(RecvError::Closed) => break,
        }

        loop {
            match changes.try_recv() {
                Ok(()) | Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        debug!("Participant change event, refreshing roster");
        if let Err(e) = refresh_roster(host.as_ref(), &roster).await {
            warn!("Failed to refresh roster after participant change: {}", e);
        }
    }

    debug!("Participant change stream closed");
}
