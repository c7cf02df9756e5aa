//! Toastmaster Companion - A state-managed HTTP server for meeting roles
//!
//! This library provides the state behind the Toastmasters meeting companion:
//! speech timers with color marks, a participant roster synchronized from the
//! host meeting, and the table-topics queue.

pub mod config;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
