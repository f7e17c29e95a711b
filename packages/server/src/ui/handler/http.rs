//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    domain::{DisplayName, MessageContent, RoomId, UserId, UserIdentity},
    infrastructure::dto::http::{
        MessageListDto, RecentPairsDto, RecentPairsQuery, RoomListDto, SubmitMessageRequest,
        SubmitMessageResponse, WaitingStatusDto,
    },
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Debug endpoint listing the room sessions currently in memory
pub async fn debug_rooms(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let rooms: Vec<serde_json::Value> = state
        .rooms
        .snapshots()
        .await
        .into_iter()
        .map(|snapshot| {
            serde_json::json!({
                "roomId": snapshot.room_id.as_str(),
                "memberCount": snapshot.member_count,
                "historyLength": snapshot.history.len(),
            })
        })
        .collect();
    Json(serde_json::json!({ "rooms": rooms }))
}

/// List rooms that have stored messages
pub async fn get_rooms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RoomListDto>, StatusCode> {
    match state.get_rooms_usecase.execute().await {
        Ok(rooms) => Ok(Json(RoomListDto {
            rooms: rooms.into_iter().map(RoomId::into_string).collect(),
        })),
        Err(e) => {
            tracing::error!("{}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Stored messages of a room, oldest first
pub async fn get_room_messages(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<MessageListDto>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|e| {
        tracing::warn!("Invalid room id: {}", e);
        StatusCode::BAD_REQUEST
    })?;

    match state.get_room_history_usecase.execute(&room_id).await {
        // Domain Model から DTO への変換
        Ok(messages) => Ok(Json(MessageListDto {
            messages: messages.into_iter().map(Into::into).collect(),
        })),
        Err(e) => {
            tracing::error!("{}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Store a message without going through a live room
pub async fn submit_message(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Json(request): Json<SubmitMessageRequest>,
) -> Result<Json<SubmitMessageResponse>, StatusCode> {
    let parsed = RoomId::new(room_id).and_then(|room_id| {
        let sender = UserIdentity::new(
            UserId::new(request.user_id)?,
            DisplayName::new(request.user_name)?,
        );
        Ok((room_id, sender, MessageContent::new(request.content)?))
    });
    let (room_id, sender, content) = parsed.map_err(|e| {
        tracing::warn!("Rejecting submitted message: {}", e);
        StatusCode::BAD_REQUEST
    })?;

    match state
        .submit_message_usecase
        .execute(room_id, sender, content)
        .await
    {
        Ok(_) => Ok(Json(SubmitMessageResponse { success: true })),
        Err(e) => {
            tracing::error!("{}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Queue length and open connection counts
pub async fn get_waiting_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WaitingStatusDto>, StatusCode> {
    match state.get_waiting_status_usecase.execute().await {
        Ok(status) => Ok(Json(WaitingStatusDto {
            waiting_count: status.waiting_count,
            waiting_connections: status.waiting_connections,
            room_connections: status.room_connections,
        })),
        Err(e) => {
            tracing::error!("{}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Most recent pairings, newest first
pub async fn get_recent_pairs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecentPairsQuery>,
) -> Result<Json<RecentPairsDto>, StatusCode> {
    match state.get_recent_pairings_usecase.execute(query.limit).await {
        Ok(pairs) => Ok(Json(RecentPairsDto {
            pairs: pairs.into_iter().map(Into::into).collect(),
        })),
        Err(e) => {
            tracing::error!("{}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
