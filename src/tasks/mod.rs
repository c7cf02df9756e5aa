//! Background tasks module
//!
//! This module contains the timers and host-facing tasks that run alongside
//! the HTTP server.

pub mod host_handshake;
pub mod participant_sync;
pub mod speech_timer;

// Re-export main types and functions
pub use host_handshake::{host_handshake, startup_task};
pub use participant_sync::{ParticipantSync, Subscription, SyncReport};
pub use speech_timer::{Timer, TimerSink, TimerSnapshot, TICK_INTERVAL};
