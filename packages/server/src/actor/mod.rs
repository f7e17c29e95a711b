//! Actors owning the live state of the service.
//!
//! - `WaitingCoordinator`: the single waiting-room queue and pairing algorithm
//! - `RoomSession`: one per chat room, member set and message fan-out
//! - `RoomRegistry`: room id → session handle, lazy creation and eviction
//! - `ConnectionRegistry`: connection id → actor address, for disconnect routing
//!
//! Each actor consumes its mailbox one command at a time, so its state needs
//! no locking. Store calls run in detached tasks; only a room about to be
//! evicted waits for its pending writes.

mod connection_registry;
mod coordinator;
mod error;
mod room;
mod room_registry;

pub use connection_registry::{ActorAddress, ConnectionCounts, ConnectionRecord, ConnectionRegistry};
pub use coordinator::{CoordinatorCommand, CoordinatorHandle, WaitingCoordinator};
pub use error::ActorError;
pub use room::{RoomCommand, RoomHandle, RoomSession, RoomSnapshot};
pub use room_registry::RoomRegistry;

use serde::Serialize;

use crate::domain::ConnectionHandle;

/// Serialize `frame` and queue it on `connection`.
///
/// Returns `false` when the connection is already gone.
fn push_json<T: Serialize>(connection: &ConnectionHandle, frame: &T) -> bool {
    let json = match serde_json::to_string(frame) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to serialize frame: {}", e);
            return true;
        }
    };
    match connection.push(&json) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!("{}", e);
            false
        }
    }
}
