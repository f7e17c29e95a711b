//! HTTP API request/response DTOs.

use serde::{Deserialize, Serialize};

/// `GET /api/chat/rooms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomListDto {
    pub rooms: Vec<String>,
}

/// Stored message as returned by the history endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDetailDto {
    pub id: String,
    pub room_id: String,
    pub user_id: String,
    pub user_name: String,
    pub content: String,
    /// RFC 3339 timestamp
    pub created_at: String,
}

/// `GET /api/chat/room/{room_id}/messages`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageListDto {
    pub messages: Vec<MessageDetailDto>,
}

/// `POST /api/chat/room/{room_id}/message` request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMessageRequest {
    pub user_id: String,
    pub user_name: String,
    pub content: String,
}

/// `POST /api/chat/room/{room_id}/message` response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitMessageResponse {
    pub success: bool,
}

/// `GET /api/waiting-room/status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitingStatusDto {
    /// Entries currently queued in the waiting room
    pub waiting_count: usize,
    /// Open waiting-room connections
    pub waiting_connections: usize,
    /// Open chat-room connections
    pub room_connections: usize,
}

/// Query string of `GET /api/waiting-room/recent-pairs`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentPairsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedUserDto {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingDto {
    pub room_id: String,
    pub user1: PairedUserDto,
    pub user2: PairedUserDto,
    /// RFC 3339 timestamp
    pub paired_at: String,
}

/// `GET /api/waiting-room/recent-pairs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentPairsDto {
    pub pairs: Vec<PairingDto>,
}
