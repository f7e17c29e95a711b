//! Domain entities.

use super::value_object::{
    DisplayName, MessageContent, MessageId, RoomId, Timestamp, UserId,
};

/// Self-reported identity of a client (not authenticated)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: UserId,
    pub display_name: DisplayName,
}

impl UserIdentity {
    pub fn new(id: UserId, display_name: DisplayName) -> Self {
        Self { id, display_name }
    }
}

/// A chat message as stored and broadcast by a room session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub room_id: RoomId,
    pub sender_id: UserId,
    pub sender_name: DisplayName,
    pub content: MessageContent,
    pub created_at: Timestamp,
}

impl ChatMessage {
    pub fn new(
        id: MessageId,
        room_id: RoomId,
        sender: &UserIdentity,
        content: MessageContent,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            room_id,
            sender_id: sender.id.clone(),
            sender_name: sender.display_name.clone(),
            content,
            created_at,
        }
    }
}

/// Audit record of one successful pairing
///
/// `user_a` is the participant that waited longer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingRecord {
    pub room_id: RoomId,
    pub user_a: UserIdentity,
    pub user_b: UserIdentity,
    pub paired_at: Timestamp,
}
