//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tracing::{debug, info, warn};

use crate::{
    state::{AppState, ParticipantEntry, RosterView, TimerAction, TimerKind, TopicEntry},
    tasks::TimerSnapshot,
    utils::lock,
};
use super::responses::{
    AddParticipantRequest, AddTopicRequest, ApiError, ApiResponse, HealthResponse,
    StatusResponse, TopicsResponse,
};

fn topics_response(state: &AppState) -> TopicsResponse {
    let topics = lock(&state.topics);
    TopicsResponse {
        topics: topics.summaries(),
        revealed: topics.revealed_text().map(str::to_string),
    }
}

fn parse_timer(name: &str) -> Result<TimerKind, ApiError> {
    name.parse().map_err(ApiError::NotFound)
}

/// Handle GET /participants - Current roster and sync status
pub async fn participants_handler(State(state): State<Arc<AppState>>) -> Json<RosterView> {
    Json(state.roster.view())
}

/// Handle POST /participants - Add a participant by hand
pub async fn add_participant_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddParticipantRequest>,
) -> Result<Json<ApiResponse<ParticipantEntry>>, ApiError> {
    match state.add_participant(&request.name) {
        Some(entry) => Ok(Json(ApiResponse::ok("Participant added", entry))),
        None => {
            debug!("Ignoring blank participant name");
            Err(ApiError::BadRequest("Participant name must not be empty".to_string()))
        }
    }
}

/// Handle GET /timers/:timer - Current state of one timer
pub async fn timer_handler(
    State(state): State<Arc<AppState>>,
    Path(timer): Path<String>,
) -> Result<Json<TimerSnapshot>, ApiError> {
    let kind = parse_timer(&timer)?;
    Ok(Json(state.timer(kind).snapshot()))
}

/// Handle GET /timers/:timer/stream - Server-sent display frames for one timer
pub async fn timer_stream_handler(
    State(state): State<Arc<AppState>>,
    Path(timer): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let kind = parse_timer(&timer)?;
    let display_rx = state.subscribe_timer(kind);
    debug!("Timer {} stream opened", kind.as_str());

    // The current frame goes out first, then one event per change
    let frames = stream::unfold((display_rx, true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let data = serde_json::to_string(&*rx.borrow_and_update()).unwrap_or_default();
        Some((Ok(Event::default().event("tick").data(data)), (rx, false)))
    });

    Ok(Sse::new(frames).keep_alive(KeepAlive::default()))
}

/// Handle POST /timers/:timer/:action - start, stop or reset a timer
pub async fn timer_action_handler(
    State(state): State<Arc<AppState>>,
    Path((timer, action)): Path<(String, String)>,
) -> Result<Json<ApiResponse<TimerSnapshot>>, ApiError> {
    let kind = parse_timer(&timer)?;
    let action: TimerAction = action.parse().map_err(ApiError::NotFound)?;

    let snapshot = state.control_timer(kind, action);
    info!("Timer {} {} at {}", kind.as_str(), action.as_str(), snapshot.display);
    Ok(Json(ApiResponse::ok(
        format!("Timer {} {}", kind.as_str(), action.as_str()),
        snapshot,
    )))
}

/// Handle GET /topics - Topic numbers and the revealed topic
pub async fn topics_handler(State(state): State<Arc<AppState>>) -> Json<TopicsResponse> {
    Json(topics_response(&state))
}

/// Handle POST /topics - Queue a new table topic
pub async fn add_topic_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddTopicRequest>,
) -> Result<Json<ApiResponse<TopicEntry>>, ApiError> {
    state
        .add_topic(&request.text)
        .map(|entry| Json(ApiResponse::ok(format!("Topic #{} added", entry.ordinal), entry)))
        .ok_or_else(|| ApiError::BadRequest("Topic text must not be empty".to_string()))
}

/// Handle POST /topics/:ordinal/reveal - Show a topic by number
pub async fn reveal_topic_handler(
    State(state): State<Arc<AppState>>,
    Path(ordinal): Path<u32>,
) -> Result<Json<ApiResponse<TopicEntry>>, ApiError> {
    state
        .reveal_topic(ordinal)
        .map(|entry| Json(ApiResponse::ok(format!("Topic #{} revealed", entry.ordinal), entry)))
        .ok_or_else(|| ApiError::NotFound(format!("No topic #{}", ordinal)))
}

/// Handle POST /topics/pick - Reveal a random topic
pub async fn pick_topic_handler(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Option<TopicEntry>>> {
    match state.pick_topic() {
        Some(entry) => Json(ApiResponse::ok(
            format!("Topic #{} picked", entry.ordinal),
            Some(entry),
        )),
        None => Json(ApiResponse::unchanged("No topics to pick from", None)),
    }
}

/// Handle POST /host/participant-change - Change notification pushed by the host bridge
pub async fn participant_change_handler(
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ApiError> {
    match state.notify_participant_change() {
        Some(listeners) => {
            debug!("Participant change relayed to {} listener(s)", listeners);
            Ok(StatusCode::ACCEPTED)
        }
        None => {
            warn!("Participant change received without a configured host bridge");
            Err(ApiError::NotFound("No host bridge configured".to_string()))
        }
    }
}

/// Handle GET /status - Full companion state
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        roster: state.roster.view(),
        timers: state.timer_snapshots(),
        topics: topics_response(&state),
        host_integration: state.host.is_some(),
        live_roster: state.has_live_roster(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.bind_host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
