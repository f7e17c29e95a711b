//! Errors raised when talking to an actor.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActorError {
    /// The coordinator task has stopped
    #[error("waiting coordinator is not running")]
    CoordinatorUnavailable,

    /// The room session stopped before handling the command
    #[error("room '{0}' is not available")]
    RoomUnavailable(String),
}
