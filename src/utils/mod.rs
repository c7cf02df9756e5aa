//! Utility functions module
//!
//! This module contains utility functions used throughout the application.

pub mod locks;
pub mod signals;

// Re-export main functions
pub use locks::lock;
pub use signals::shutdown_signal;
