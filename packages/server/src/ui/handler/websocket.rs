//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    actor::RoomHandle,
    domain::{
        ConnectionHandle, ConnectionId, ConnectionIdFactory, MessageContent, PushMessage, RoomId,
        UserIdentity,
    },
    infrastructure::dto::{
        conversion::optional_identity,
        websocket::{FrameEnvelope, JoinMessage, MessageType, SendChatMessage},
    },
    ui::state::AppState,
};

/// Query parameters of the chat room WebSocket
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomConnectQuery {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
}

/// Spawns a task that drains the connection's outbound channel into the WebSocket sender.
///
/// Frames are written in the order they were pushed. A `Close` request closes
/// the socket and ends the task.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<PushMessage>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(push) = rx.recv().await {
            match push {
                PushMessage::Frame(text) => {
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                PushMessage::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    })
}

/// Create the outbound channel of a new connection
fn open_connection() -> (ConnectionHandle, mpsc::UnboundedReceiver<PushMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ConnectionHandle::new(ConnectionIdFactory::generate(), tx), rx)
}

// ========================================
// Waiting room
// ========================================

pub async fn waiting_room_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_waiting_socket(socket, state))
}

async fn handle_waiting_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();
    let (connection, rx) = open_connection();
    let connection_id = connection.id();

    state
        .join_waiting_room_usecase
        .register(connection_id)
        .await;
    tracing::info!("Connection '{}' opened on waiting room", connection_id);

    let state_clone = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    if let Err(e) = state_clone.join_waiting_room_usecase.touch(connection_id) {
                        tracing::error!("{}", e);
                        break;
                    }
                    handle_waiting_frame(&state_clone, &connection, text.as_str()).await;
                }
                // Heartbeats count as activity while waiting
                Message::Ping(_) | Message::Pong(_) => {
                    if let Err(e) = state_clone.join_waiting_room_usecase.touch(connection_id) {
                        tracing::error!("{}", e);
                        break;
                    }
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    release_connection(&state, connection_id).await;
}

async fn handle_waiting_frame(state: &AppState, connection: &ConnectionHandle, text: &str) {
    match FrameEnvelope::peek(text) {
        Ok(MessageType::Join) => {}
        Ok(other) => {
            tracing::debug!("Ignoring {:?} frame on waiting room", other);
            return;
        }
        Err(e) => {
            tracing::warn!("Malformed frame from '{}': {}", connection.id(), e);
            return;
        }
    }

    let join = match serde_json::from_str::<JoinMessage>(text) {
        Ok(join) => join,
        Err(e) => {
            tracing::warn!("Malformed join frame from '{}': {}", connection.id(), e);
            return;
        }
    };
    let identity = match UserIdentity::try_from(join) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!("Invalid join frame from '{}': {}", connection.id(), e);
            return;
        }
    };

    tracing::info!(
        "User '{}' ({}) joined the waiting room",
        identity.id.as_str(),
        identity.display_name.as_str()
    );
    if let Err(e) = state
        .join_waiting_room_usecase
        .execute(identity, connection.clone())
        .await
    {
        tracing::error!("Failed to join waiting room: {}", e);
    }
}

// ========================================
// Chat room
// ========================================

pub async fn room_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(query): Query<RoomConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let room_id = match RoomId::new(room_id) {
        Ok(room_id) => room_id,
        Err(e) => {
            tracing::warn!("Rejecting room connection: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    // A bad identity in the query only means the client must send it per message.
    let identity = optional_identity(query.user_id, query.user_name).unwrap_or_else(|e| {
        tracing::warn!("Ignoring invalid identity for room {}: {}", room_id, e);
        None
    });

    Ok(ws.on_upgrade(move |socket| handle_room_socket(socket, state, room_id, identity)))
}

async fn handle_room_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    room_id: RoomId,
    identity: Option<UserIdentity>,
) {
    let (sender, mut receiver) = socket.split();
    let (connection, rx) = open_connection();
    let connection_id = connection.id();

    let room = match state
        .enter_room_usecase
        .execute(room_id.clone(), connection, identity)
        .await
    {
        Ok(room) => room,
        Err(e) => {
            tracing::error!("Connection '{}' could not enter room {}: {}", connection_id, room_id, e);
            return;
        }
    };

    let state_clone = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_room_frame(&state_clone, &room, connection_id, text.as_str()).await;
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    release_connection(&state, connection_id).await;
}

async fn handle_room_frame(
    state: &AppState,
    room: &RoomHandle,
    connection_id: ConnectionId,
    text: &str,
) {
    match FrameEnvelope::peek(text) {
        Ok(MessageType::Message) => {}
        Ok(other) => {
            tracing::debug!("Ignoring {:?} frame in room {}", other, room.room_id());
            return;
        }
        Err(e) => {
            tracing::warn!("Malformed frame from '{}': {}", connection_id, e);
            return;
        }
    }

    let frame = match serde_json::from_str::<SendChatMessage>(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!("Malformed message frame from '{}': {}", connection_id, e);
            return;
        }
    };
    let content = match MessageContent::new(frame.message) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Invalid message from '{}': {}", connection_id, e);
            return;
        }
    };
    let identity = match optional_identity(frame.user_id, frame.user_name) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!("Invalid sender identity from '{}': {}", connection_id, e);
            return;
        }
    };

    tracing::debug!("Message from '{}' in room {}", connection_id, room.room_id());
    if let Err(e) = state
        .send_message_usecase
        .execute(room, connection_id, identity, content)
        .await
    {
        tracing::warn!("Failed to send message: {}", e);
    }
}

/// Detach a closed connection from whichever actor it belonged to
async fn release_connection(state: &AppState, connection_id: ConnectionId) {
    match state
        .disconnect_participant_usecase
        .execute(connection_id)
        .await
    {
        Some(record) => tracing::info!(
            "Connection '{}' closed ({:?})",
            connection_id,
            record.address
        ),
        None => tracing::debug!("Connection '{}' was already released", connection_id),
    }
}
