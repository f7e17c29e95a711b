//! Domain layer for the pairing and chat relay service.
//!
//! This module contains business types that are independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod factory;
pub mod pusher;
pub mod store;
pub mod value_object;

pub use entity::{ChatMessage, PairingRecord, UserIdentity};
pub use error::{MessagePushError, StoreError, ValueObjectError};
pub use factory::{ConnectionIdFactory, MessageIdFactory, RoomIdFactory};
pub use pusher::{ConnectionHandle, PushMessage, PusherChannel};
pub use store::MessageStore;
#[cfg(test)]
pub use store::MockMessageStore;
pub use value_object::{
    ConnectionId, DisplayName, MessageContent, MessageId, RoomId, Timestamp, UserId,
};
