//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        debug_rooms, get_recent_pairs, get_room_messages, get_rooms, get_waiting_status,
        health_check, room_websocket_handler, submit_message, waiting_room_websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Matchmaking and chat relay server
///
/// # Example
///
/// ```ignore
/// let state = Arc::new(AppState::new(&config, store, clock));
/// Server::new(state).run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Build the router with every endpoint
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route(
                "/api/waiting-room/websocket",
                get(waiting_room_websocket_handler),
            )
            .route(
                "/api/chat/room/{room_id}/websocket",
                get(room_websocket_handler),
            )
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/chat/rooms", get(get_rooms))
            .route("/api/chat/room/{room_id}/messages", get(get_room_messages))
            .route("/api/chat/room/{room_id}/message", post(submit_message))
            .route("/api/waiting-room/status", get(get_waiting_status))
            .route("/api/waiting-room/recent-pairs", get(get_recent_pairs))
            .route("/debug/rooms", get(debug_rooms))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Tandem server listening on {}", listener.local_addr()?);
        tracing::info!("Waiting room: ws://{}/api/waiting-room/websocket", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
