//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/participants", get(participants_handler).post(add_participant_handler))
        .route("/timers/:timer", get(timer_handler))
        .route("/timers/:timer/stream", get(timer_stream_handler))
        .route("/timers/:timer/:action", post(timer_action_handler))
        .route("/topics", get(topics_handler).post(add_topic_handler))
        .route("/topics/pick", post(pick_topic_handler))
        .route("/topics/:ordinal/reveal", post(reveal_topic_handler))
        // Pushed by the host bridge
        .route("/host/participant-change", post(participant_change_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
