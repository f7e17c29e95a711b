//! Value objects.
//!
//! Self-reported client input (user id, display name, room id, content) is
//! validated here once; everything past this layer can rely on the invariants.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

pub const MAX_USER_ID_LENGTH: usize = 64;
pub const MAX_DISPLAY_NAME_LENGTH: usize = 64;
pub const MAX_ROOM_ID_LENGTH: usize = 128;
pub const MAX_MESSAGE_CONTENT_LENGTH: usize = 1000;

/// Client-reported user id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let length = value.chars().count();
        if value.trim().is_empty() {
            return Err(ValueObjectError::UserIdEmpty);
        }
        if length > MAX_USER_ID_LENGTH {
            return Err(ValueObjectError::UserIdTooLong {
                max: MAX_USER_ID_LENGTH,
                actual: length,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Client-reported display name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let length = value.chars().count();
        if value.trim().is_empty() {
            return Err(ValueObjectError::DisplayNameEmpty);
        }
        if length > MAX_DISPLAY_NAME_LENGTH {
            return Err(ValueObjectError::DisplayNameTooLong {
                max: MAX_DISPLAY_NAME_LENGTH,
                actual: length,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Chat room id
///
/// Room ids appear in URL paths, so only `[A-Za-z0-9_-]` is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::RoomIdEmpty);
        }
        let length = value.chars().count();
        if length > MAX_ROOM_ID_LENGTH {
            return Err(ValueObjectError::RoomIdTooLong {
                max: MAX_ROOM_ID_LENGTH,
                actual: length,
            });
        }
        if let Some(c) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(ValueObjectError::RoomIdInvalidCharacter(c));
        }
        Ok(Self(value))
    }

    /// UUID strings always satisfy the room id character set
    pub(super) fn from_uuid(value: Uuid) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Chat message body (a single emoji in practice; not enforced)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::MessageContentEmpty);
        }
        let length = value.chars().count();
        if length > MAX_MESSAGE_CONTENT_LENGTH {
            return Err(ValueObjectError::MessageContentTooLong {
                max: MAX_MESSAGE_CONTENT_LENGTH,
                actual: length,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Server-generated id of a single duplex connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Server-generated chat message id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
