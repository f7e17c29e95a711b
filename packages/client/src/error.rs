//! Error types for the Tandem client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server could not be reached
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// An established connection was closed before the session finished
    #[error("Connection lost")]
    ConnectionLost,
}

impl ClientError {
    /// Whether the failed session had reached the server at all
    pub fn was_connected(&self) -> bool {
        matches!(self, ClientError::ConnectionLost)
    }
}
