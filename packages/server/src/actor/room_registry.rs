//! Room id → room session lookup.
//!
//! Sessions are created on first use and remove themselves from the
//! directory after staying empty for the configured grace period.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use tandem_shared::time::Clock;
use tokio::sync::Mutex;

use crate::{
    config::RoomConfig,
    domain::{ConnectionHandle, MessageStore, RoomId, UserIdentity},
};

use super::{
    error::ActorError,
    room::{RoomDirectory, RoomHandle, RoomSession, RoomSnapshot},
};

/// Attempts made by `connect` when it races with an eviction
const CONNECT_ATTEMPTS: usize = 2;

pub struct RoomRegistry {
    rooms: RoomDirectory,
    store: Arc<dyn MessageStore>,
    clock: Arc<dyn Clock>,
    config: RoomConfig,
    next_instance: AtomicU64,
}

impl RoomRegistry {
    pub fn new(store: Arc<dyn MessageStore>, clock: Arc<dyn Clock>, config: RoomConfig) -> Self {
        Self {
            rooms: Arc::new(Mutex::new(HashMap::new())),
            store,
            clock,
            config,
            next_instance: AtomicU64::new(1),
        }
    }

    /// Return the live session for `room_id`, starting one if needed
    pub async fn get_or_spawn(&self, room_id: &RoomId) -> RoomHandle {
        let mut rooms = self.rooms.lock().await;
        if let Some(handle) = rooms.get(room_id)
            && !handle.is_closed()
        {
            return handle.clone();
        }

        let instance = self.next_instance.fetch_add(1, Ordering::Relaxed);
        let handle = RoomSession::spawn(
            room_id.clone(),
            instance,
            self.rooms.clone(),
            self.store.clone(),
            self.clock.clone(),
            self.config,
        );
        rooms.insert(room_id.clone(), handle.clone());
        tracing::debug!("Spawned room session {} (instance {})", room_id, instance);
        handle
    }

    /// Return the live session for `room_id` without starting one
    pub async fn get(&self, room_id: &RoomId) -> Option<RoomHandle> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(room_id)
            .filter(|handle| !handle.is_closed())
            .cloned()
    }

    /// Attach a connection to `room_id`, returning the session it joined.
    ///
    /// If the session found in the directory stops before taking the
    /// connection, a fresh one is started and the connect is retried.
    pub async fn connect(
        &self,
        room_id: &RoomId,
        connection: ConnectionHandle,
        identity: Option<UserIdentity>,
    ) -> Result<RoomHandle, ActorError> {
        let mut last_error = ActorError::RoomUnavailable(room_id.to_string());
        for attempt in 1..=CONNECT_ATTEMPTS {
            let handle = self.get_or_spawn(room_id).await;
            match handle.connect(connection.clone(), identity.clone()).await {
                Ok(()) => return Ok(handle),
                Err(e) => {
                    tracing::debug!(
                        "Connect to room {} failed on attempt {}: {}",
                        room_id,
                        attempt,
                        e
                    );
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    /// Ids of the rooms currently held in memory
    pub async fn active_rooms(&self) -> Vec<RoomId> {
        let rooms = self.rooms.lock().await;
        let mut ids: Vec<RoomId> = rooms
            .iter()
            .filter(|(_, handle)| !handle.is_closed())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Snapshots of every live room, skipping those that stop meanwhile
    pub async fn snapshots(&self) -> Vec<RoomSnapshot> {
        let handles: Vec<RoomHandle> = {
            let rooms = self.rooms.lock().await;
            rooms.values().cloned().collect()
        };

        let mut snapshots = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Ok(snapshot) = handle.snapshot().await {
                snapshots.push(snapshot);
            }
        }
        snapshots.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        snapshots
    }
}
