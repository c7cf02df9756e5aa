//! Toastmaster Companion - A state-managed HTTP server for meeting roles
//!
//! This is the main entry point for the toastmaster-companion application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use toastmaster_companion::{
    config::Config,
    state::AppState,
    api::create_router,
    services::HttpHost,
    tasks::startup_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("toastmaster_companion={},tower_http=info", config.log_level()))
        .init();

    info!("Starting toastmaster-companion server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, host_api={}",
          config.host, config.port, config.host_api_url.as_deref().unwrap_or("none"));

    // Create application state
    let mut state = AppState::new(
        config.port,
        config.host.clone(),
        config.prepared_speech_thresholds(),
        config.table_topics_thresholds(),
    );
    if let Some(url) = &config.host_api_url {
        state = state.with_http_host(Arc::new(HttpHost::new(url)?));
    }
    let state = Arc::new(state);

    // Host handshake and first roster population
    let startup_state = Arc::clone(&state);
    tokio::spawn(async move {
        startup_task(startup_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /participants                - Roster and sync status");
    info!("  POST /participants                - Add a participant by hand");
    info!("  GET  /timers/:timer               - Timer state (prepared-speech, table-topics)");
    info!("  GET  /timers/:timer/stream        - Live timer display (server-sent events)");
    info!("  POST /timers/:timer/start|stop|reset");
    info!("  GET  /topics                      - Table topics");
    info!("  POST /topics                      - Add a table topic");
    info!("  POST /topics/:ordinal/reveal      - Reveal a topic");
    info!("  POST /topics/pick                 - Reveal a random topic");
    info!("  POST /host/participant-change     - Host bridge change notification");
    info!("  GET  /status                      - Full companion state");
    info!("  GET  /health                      - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
