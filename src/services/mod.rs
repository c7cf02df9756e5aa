//! External collaborator module
//!
//! This module contains the host capability API the companion depends on
//! and its HTTP bridge implementation.

pub mod host;
pub mod http_host;

// Re-export main types
pub use host::{HostApi, HostConfig, HostError, UserContext, CAPABILITIES};
pub use http_host::HttpHost;
