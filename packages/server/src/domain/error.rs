//! Domain error types.

use thiserror::Error;

/// Validation errors raised when constructing value objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("user id must not be empty")]
    UserIdEmpty,

    #[error("user id is too long (max {max} characters, got {actual})")]
    UserIdTooLong { max: usize, actual: usize },

    #[error("display name must not be empty")]
    DisplayNameEmpty,

    #[error("display name is too long (max {max} characters, got {actual})")]
    DisplayNameTooLong { max: usize, actual: usize },

    #[error("room id must not be empty")]
    RoomIdEmpty,

    #[error("room id is too long (max {max} characters, got {actual})")]
    RoomIdTooLong { max: usize, actual: usize },

    #[error("room id contains an invalid character: {0:?}")]
    RoomIdInvalidCharacter(char),

    #[error("message content must not be empty")]
    MessageContentEmpty,

    #[error("message content is too long (max {max} characters, got {actual})")]
    MessageContentTooLong { max: usize, actual: usize },
}

/// Errors reported by a `MessageStore` implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("message store is unavailable: {0}")]
    Unavailable(String),

    #[error("message store query failed: {0}")]
    QueryFailed(String),
}

/// Errors raised when pushing a frame to a connection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' is closed")]
    ConnectionClosed(String),
}
