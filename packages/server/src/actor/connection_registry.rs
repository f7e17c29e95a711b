//! Bookkeeping of live duplex connections.
//!
//! Knows which actor each open connection talks to so that a closed socket
//! can be routed to the right cleanup call. Holds no business logic.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::{ConnectionId, RoomId, Timestamp, UserIdentity};

/// Which actor a connection belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorAddress {
    Coordinator,
    Room(RoomId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRecord {
    pub address: ActorAddress,
    /// Self-reported identity, once known
    pub identity: Option<UserIdentity>,
    pub connected_at: Timestamp,
}

/// Number of open connections per actor kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionCounts {
    pub waiting: usize,
    pub in_room: usize,
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<ConnectionId, ConnectionRecord>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(
        &self,
        connection_id: ConnectionId,
        address: ActorAddress,
        identity: Option<UserIdentity>,
        connected_at: Timestamp,
    ) {
        let mut connections = self.connections.lock().await;
        connections.insert(
            connection_id,
            ConnectionRecord {
                address,
                identity,
                connected_at,
            },
        );
    }

    /// Record the identity a connection reported after it was registered
    pub async fn set_identity(&self, connection_id: ConnectionId, identity: UserIdentity) {
        let mut connections = self.connections.lock().await;
        if let Some(record) = connections.get_mut(&connection_id) {
            record.identity = Some(identity);
        }
    }

    /// Forget a connection, returning where it was attached
    pub async fn unregister(&self, connection_id: ConnectionId) -> Option<ConnectionRecord> {
        let mut connections = self.connections.lock().await;
        connections.remove(&connection_id)
    }

    pub async fn lookup(&self, connection_id: ConnectionId) -> Option<ConnectionRecord> {
        let connections = self.connections.lock().await;
        connections.get(&connection_id).cloned()
    }

    pub async fn counts(&self) -> ConnectionCounts {
        let connections = self.connections.lock().await;
        connections
            .values()
            .fold(ConnectionCounts::default(), |mut counts, record| {
                match record.address {
                    ActorAddress::Coordinator => counts.waiting += 1,
                    ActorAddress::Room(_) => counts.in_room += 1,
                }
                counts
            })
    }
}
