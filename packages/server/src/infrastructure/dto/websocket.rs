//! WebSocket frame DTOs.
//!
//! Every frame is a JSON object with a `type` discriminator and camelCase fields.

use serde::{Deserialize, Serialize};

/// Frame type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// client → server: enter the waiting room
    Join,
    /// server → client: current queue position
    Waiting,
    /// server → client: pairing result
    Paired,
    /// server → client: recent room history, sent once on connect
    History,
    /// client → server submission / server → client broadcast
    Message,
}

/// Minimal view of a frame used to dispatch on its type
#[derive(Debug, Deserialize)]
pub struct FrameEnvelope {
    pub r#type: MessageType,
}

impl FrameEnvelope {
    /// Read only the `type` field of a JSON frame
    pub fn peek(text: &str) -> Result<MessageType, serde_json::Error> {
        serde_json::from_str::<FrameEnvelope>(text).map(|envelope| envelope.r#type)
    }
}

/// `{type:"join", userId, userName}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinMessage {
    pub r#type: MessageType,
    pub user_id: String,
    pub user_name: String,
}

impl JoinMessage {
    pub fn new(user_id: String, user_name: String) -> Self {
        Self {
            r#type: MessageType::Join,
            user_id,
            user_name,
        }
    }
}

/// `{type:"waiting", position, message?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitingMessage {
    pub r#type: MessageType,
    pub position: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WaitingMessage {
    pub fn new(position: usize, message: Option<String>) -> Self {
        Self {
            r#type: MessageType::Waiting,
            position,
            message,
        }
    }
}

/// `{type:"paired", roomId, partnerName}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairedMessage {
    pub r#type: MessageType,
    pub room_id: String,
    pub partner_name: String,
}

impl PairedMessage {
    pub fn new(room_id: String, partner_name: String) -> Self {
        Self {
            r#type: MessageType::Paired,
            room_id,
            partner_name,
        }
    }
}

/// Stored chat message shape shared by `history` and `message` frames
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageDto {
    pub id: String,
    pub room_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub content: String,
    /// Unix timestamp (milliseconds)
    pub created_at: i64,
}

/// `{type:"history", messages:[...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryMessage {
    pub r#type: MessageType,
    pub messages: Vec<ChatMessageDto>,
}

impl HistoryMessage {
    pub fn new(messages: Vec<ChatMessageDto>) -> Self {
        Self {
            r#type: MessageType::History,
            messages,
        }
    }
}

/// client → server `{type:"message", userId?, userName?, message}`
///
/// The identity fields are optional: a connection that supplied its identity
/// when connecting may send the bare content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendChatMessage {
    pub r#type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub message: String,
}

impl SendChatMessage {
    pub fn new(user_id: Option<String>, user_name: Option<String>, message: String) -> Self {
        Self {
            r#type: MessageType::Message,
            user_id,
            user_name,
            message,
        }
    }
}

/// server → client `{type:"message", message:{...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBroadcastMessage {
    pub r#type: MessageType,
    pub message: ChatMessageDto,
}

impl ChatBroadcastMessage {
    pub fn new(message: ChatMessageDto) -> Self {
        Self {
            r#type: MessageType::Message,
            message,
        }
    }
}
