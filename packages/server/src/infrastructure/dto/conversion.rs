//! Conversion logic between DTOs and domain entities.

use tandem_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    ChatMessage, DisplayName, PairingRecord, UserId, UserIdentity, ValueObjectError,
};
use crate::infrastructure::dto::{http, websocket};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<ChatMessage> for websocket::ChatMessageDto {
    fn from(model: ChatMessage) -> Self {
        Self {
            id: model.id.into_string(),
            room_id: model.room_id.into_string(),
            sender_id: model.sender_id.into_string(),
            sender_name: model.sender_name.into_string(),
            content: model.content.into_string(),
            created_at: model.created_at.value(),
        }
    }
}

impl From<ChatMessage> for http::MessageDetailDto {
    fn from(model: ChatMessage) -> Self {
        Self {
            id: model.id.into_string(),
            room_id: model.room_id.into_string(),
            user_id: model.sender_id.into_string(),
            user_name: model.sender_name.into_string(),
            content: model.content.into_string(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}

impl From<UserIdentity> for http::PairedUserDto {
    fn from(model: UserIdentity) -> Self {
        Self {
            id: model.id.into_string(),
            name: model.display_name.into_string(),
        }
    }
}

impl From<PairingRecord> for http::PairingDto {
    fn from(model: PairingRecord) -> Self {
        Self {
            room_id: model.room_id.into_string(),
            user1: model.user_a.into(),
            user2: model.user_b.into(),
            paired_at: timestamp_to_rfc3339(model.paired_at.value()),
        }
    }
}

// ========================================
// DTO → Domain Entity
// ========================================

impl TryFrom<websocket::JoinMessage> for UserIdentity {
    type Error = ValueObjectError;

    fn try_from(dto: websocket::JoinMessage) -> Result<Self, Self::Error> {
        Ok(UserIdentity::new(
            UserId::new(dto.user_id)?,
            DisplayName::new(dto.user_name)?,
        ))
    }
}

/// Build an identity from optional id/name fields.
///
/// Returns `Ok(None)` unless both fields are present.
pub fn optional_identity(
    user_id: Option<String>,
    user_name: Option<String>,
) -> Result<Option<UserIdentity>, ValueObjectError> {
    match (user_id, user_name) {
        (Some(user_id), Some(user_name)) => Ok(Some(UserIdentity::new(
            UserId::new(user_id)?,
            DisplayName::new(user_name)?,
        ))),
        _ => Ok(None),
    }
}
