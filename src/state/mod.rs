//! State management module
//!
//! This module contains all state-related structures and their management logic.

pub mod app_state;
pub mod roster;
pub mod timer_state;
pub mod topics;

// Re-export main types
pub use app_state::{AppState, TimerAction, TimerKind};
pub use roster::{parse_participants, ParticipantEntry, Roster, RosterView, SyncStatus};
pub use timer_state::{format_elapsed, ColorState, Thresholds, TimerDisplay, TimerState};
pub use topics::{TopicEntry, TopicList, TopicSummary};
