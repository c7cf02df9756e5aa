//! Main application state management

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use rand::thread_rng;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

use super::{ParticipantEntry, Roster, Thresholds, TimerDisplay, TopicEntry, TopicList};
use crate::{
    services::{HostApi, HttpHost},
    tasks::{ParticipantSync, Subscription, Timer, TimerSnapshot},
    utils::lock,
};

/// The two timed segments of a meeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerKind {
    PreparedSpeech,
    TableTopics,
}

impl TimerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerKind::PreparedSpeech => "prepared-speech",
            TimerKind::TableTopics => "table-topics",
        }
    }
}

impl FromStr for TimerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prepared-speech" => Ok(TimerKind::PreparedSpeech),
            "table-topics" => Ok(TimerKind::TableTopics),
            other => Err(format!("Unknown timer: {}", other)),
        }
    }
}

/// Control applied to a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    Start,
    Stop,
    Reset,
}

impl TimerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerAction::Start => "start",
            TimerAction::Stop => "stop",
            TimerAction::Reset => "reset",
        }
    }
}

impl FromStr for TimerAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(TimerAction::Start),
            "stop" => Ok(TimerAction::Stop),
            "reset" => Ok(TimerAction::Reset),
            other => Err(format!("Unknown timer action: {}", other)),
        }
    }
}

/// A timer together with the display channel it renders into
#[derive(Debug)]
struct TimerSlot {
    timer: Timer,
    display_rx: watch::Receiver<TimerDisplay>,
}

impl TimerSlot {
    fn new(kind: TimerKind, thresholds: Thresholds) -> Self {
        let (display_tx, display_rx) = watch::channel(TimerDisplay::zero());
        Self {
            timer: Timer::new(kind.as_str(), thresholds, Arc::new(display_tx)),
            display_rx,
        }
    }
}

/// Main application state shared by all handlers and background tasks
pub struct AppState {
    /// Participant list fed by host sync and manual entry
    pub roster: Roster,
    pub topics: Mutex<TopicList>,
    prepared_speech: TimerSlot,
    table_topics: TimerSlot,
    /// Host capability API, absent when no bridge is configured
    pub host: Option<Arc<dyn HostApi>>,
    change_relay: Option<Arc<HttpHost>>,
    subscription: Mutex<Option<Subscription>>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub bind_host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Create state with both timers stopped and no host integration
    pub fn new(
        port: u16,
        bind_host: String,
        prepared_speech: Thresholds,
        table_topics: Thresholds,
    ) -> Self {
        Self {
            roster: Roster::new(),
            topics: Mutex::new(TopicList::new()),
            prepared_speech: TimerSlot::new(TimerKind::PreparedSpeech, prepared_speech),
            table_topics: TimerSlot::new(TimerKind::TableTopics, table_topics),
            host: None,
            change_relay: None,
            subscription: Mutex::new(None),
            start_time: Instant::now(),
            port,
            bind_host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Use an arbitrary host implementation
    pub fn with_host(mut self, host: Arc<dyn HostApi>) -> Self {
        self.host = Some(host);
        self
    }

    /// Use the HTTP bridge, which also receives change notifications
    /// through this server
    pub fn with_http_host(mut self, host: Arc<HttpHost>) -> Self {
        self.change_relay = Some(Arc::clone(&host));
        self.host = Some(host);
        self
    }

    fn record_action(&self, action: String) {
        debug!("Recording action: {}", action);
        *lock(&self.last_action) = Some(action);
        *lock(&self.last_action_time) = Some(Utc::now());
    }

    pub fn participant_sync(&self) -> ParticipantSync {
        ParticipantSync::new(self.host.clone(), self.roster.clone())
    }

    /// Hold the live roster subscription for the lifetime of the server
    pub fn keep_subscription(&self, subscription: Option<Subscription>) {
        *lock(&self.subscription) = subscription;
    }

    pub fn has_live_roster(&self) -> bool {
        lock(&self.subscription)
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    /// Relay a participant change pushed by the host bridge.
    /// Returns `None` when no bridge is configured.
    pub fn notify_participant_change(&self) -> Option<usize> {
        let relay = self.change_relay.as_ref()?;
        Some(relay.notify_participant_change())
    }

    /// Add a manually typed participant
    pub fn add_participant(&self, name: &str) -> Option<ParticipantEntry> {
        let entry = self.roster.add_manual(name)?;
        info!("Participant added manually: {}", entry.display_name);
        self.record_action(format!("add-participant:{}", entry.display_name));
        Some(entry)
    }

    fn slot(&self, kind: TimerKind) -> &TimerSlot {
        match kind {
            TimerKind::PreparedSpeech => &self.prepared_speech,
            TimerKind::TableTopics => &self.table_topics,
        }
    }

    pub fn timer(&self, kind: TimerKind) -> &Timer {
        &self.slot(kind).timer
    }

    /// Watch the frames a timer renders
    pub fn subscribe_timer(&self, kind: TimerKind) -> watch::Receiver<TimerDisplay> {
        self.slot(kind).display_rx.clone()
    }

    /// Apply a start/stop/reset control and return the resulting snapshot
    pub fn control_timer(&self, kind: TimerKind, action: TimerAction) -> TimerSnapshot {
        let timer = self.timer(kind);
        match action {
            TimerAction::Start => timer.start(),
            TimerAction::Stop => timer.stop(),
            TimerAction::Reset => timer.reset(),
        }
        self.record_action(format!("{}:{}", kind.as_str(), action.as_str()));
        timer.snapshot()
    }

    pub fn timer_snapshots(&self) -> Vec<TimerSnapshot> {
        [TimerKind::PreparedSpeech, TimerKind::TableTopics]
            .into_iter()
            .map(|kind| self.timer(kind).snapshot())
            .collect()
    }

    pub fn add_topic(&self, text: &str) -> Option<TopicEntry> {
        let entry = lock(&self.topics).add(text).cloned()?;
        info!("Table topic #{} added", entry.ordinal);
        self.record_action(format!("add-topic:{}", entry.ordinal));
        Some(entry)
    }

    pub fn reveal_topic(&self, ordinal: u32) -> Option<TopicEntry> {
        let entry = lock(&self.topics).reveal(ordinal).cloned()?;
        info!("Table topic #{} revealed", entry.ordinal);
        self.record_action(format!("reveal-topic:{}", entry.ordinal));
        Some(entry)
    }

    /// Reveal a random topic; `None` when there are no topics
    pub fn pick_topic(&self) -> Option<TopicEntry> {
        let entry = lock(&self.topics).pick_random(&mut thread_rng()).cloned()?;
        info!("Table topic #{} picked at random", entry.ordinal);
        self.record_action(format!("pick-topic:{}", entry.ordinal));
        Some(entry)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = lock(&self.last_action).clone();
        let last_action_time = *lock(&self.last_action_time);
        (last_action, last_action_time)
    }
}
