//! Outbound side of a duplex connection.
//!
//! Actors never touch sockets. Each accepted connection owns an unbounded
//! channel; the UI layer drains it into the socket in order, so frames pushed
//! by one actor arrive at the client in push order.

use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError};

/// Item carried by a connection's outbound channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushMessage {
    /// JSON text frame
    Frame(String),
    /// Ask the connection task to close the socket after the frames queued so far
    Close,
}

/// Sender half of a connection's outbound channel
pub type PusherChannel = mpsc::UnboundedSender<PushMessage>;

/// Handle an actor holds for a connection it is responsible for
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: PusherChannel,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, sender: PusherChannel) -> Self {
        Self { id, sender }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a text frame for this connection
    pub fn push(&self, frame: &str) -> Result<(), MessagePushError> {
        self.sender
            .send(PushMessage::Frame(frame.to_string()))
            .map_err(|_| MessagePushError::ConnectionClosed(self.id.to_string()))
    }

    /// Request the socket to be closed once queued frames are flushed
    pub fn close(&self) {
        if self.sender.send(PushMessage::Close).is_err() {
            tracing::debug!("Connection '{}' already closed", self.id);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
