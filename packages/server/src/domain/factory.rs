//! Factories for server-generated identifiers.

use uuid::Uuid;

use super::value_object::{ConnectionId, MessageId, RoomId};

/// Allocates fresh, collision-resistant room ids (UUID v4)
pub struct RoomIdFactory;

impl RoomIdFactory {
    pub fn generate() -> RoomId {
        RoomId::from_uuid(Uuid::new_v4())
    }
}

/// Allocates ids for newly accepted duplex connections
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    pub fn generate() -> ConnectionId {
        ConnectionId::from_uuid(Uuid::new_v4())
    }
}

/// Allocates ids for chat messages
pub struct MessageIdFactory;

impl MessageIdFactory {
    pub fn generate() -> MessageId {
        MessageId::new(Uuid::new_v4().to_string())
    }
}
