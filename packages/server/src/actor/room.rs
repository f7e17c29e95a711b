//! Chat room session.
//!
//! One actor per room id. It owns the member set and the recent history of the
//! room, fans every message out to all members in receipt order, and writes
//! messages through to the store without waiting for the write. Writes go
//! through a single writer task per session, so the store receives them in
//! the same order they were broadcast.
//!
//! On start the session backfills its history from the store in a detached
//! task. Until that finishes, commands are deferred and replayed in arrival
//! order, so the mailbox keeps accepting work while the store is slow.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use tandem_shared::time::Clock;
use tokio::sync::{Mutex, mpsc, oneshot};

use crate::{
    config::RoomConfig,
    domain::{
        ChatMessage, ConnectionHandle, ConnectionId, MessageContent, MessageIdFactory,
        MessageStore, RoomId, Timestamp, UserIdentity,
    },
    infrastructure::dto::websocket::{ChatBroadcastMessage, ChatMessageDto, HistoryMessage},
};

use super::{error::ActorError, push_json};

/// Shared room id → handle map, owned by the `RoomRegistry`
pub(super) type RoomDirectory = Arc<Mutex<HashMap<RoomId, RoomHandle>>>;

/// Commands accepted by a room mailbox
#[derive(Debug)]
pub enum RoomCommand {
    Connect {
        connection: ConnectionHandle,
        identity: Option<UserIdentity>,
        /// Answered once the member has been added and sent the history
        ack: oneshot::Sender<()>,
    },
    Receive {
        connection_id: ConnectionId,
        /// Identity carried by the frame, if any
        identity: Option<UserIdentity>,
        content: MessageContent,
    },
    Disconnect {
        connection_id: ConnectionId,
    },
    Snapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },
    /// Result of the start-up backfill
    HistoryLoaded(Vec<ChatMessage>),
}

/// Work queued on the writer task of a session
#[derive(Debug)]
enum PersistRequest {
    Insert(ChatMessage),
    /// Answered once every earlier insert has been attempted
    Flush(oneshot::Sender<()>),
}

/// Start the task persisting messages of `room_id` one at a time.
///
/// The task ends once the session drops its sender and the queue is drained.
fn spawn_writer(
    room_id: RoomId,
    store: Arc<dyn MessageStore>,
) -> mpsc::UnboundedSender<PersistRequest> {
    let (sender, mut receiver) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(request) = receiver.recv().await {
            match request {
                PersistRequest::Insert(message) => {
                    if let Err(e) = store.insert_message(message).await {
                        tracing::warn!("Failed to persist message in room {}: {}", room_id, e);
                    }
                }
                PersistRequest::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }
    });
    sender
}

/// Point-in-time view of a room, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub member_count: usize,
    pub history: Vec<ChatMessage>,
}

/// Address of one room session instance
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    instance: u64,
    sender: mpsc::UnboundedSender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub(super) fn instance(&self) -> u64 {
        self.instance
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    fn send(&self, command: RoomCommand) -> Result<(), ActorError> {
        self.sender
            .send(command)
            .map_err(|_| ActorError::RoomUnavailable(self.room_id.to_string()))
    }

    /// Add a member and wait until it has been sent the room history.
    ///
    /// Fails when this instance stopped before handling the request.
    pub async fn connect(
        &self,
        connection: ConnectionHandle,
        identity: Option<UserIdentity>,
    ) -> Result<(), ActorError> {
        let (ack, done) = oneshot::channel();
        self.send(RoomCommand::Connect {
            connection,
            identity,
            ack,
        })?;
        done.await
            .map_err(|_| ActorError::RoomUnavailable(self.room_id.to_string()))
    }

    pub fn receive(
        &self,
        connection_id: ConnectionId,
        identity: Option<UserIdentity>,
        content: MessageContent,
    ) -> Result<(), ActorError> {
        self.send(RoomCommand::Receive {
            connection_id,
            identity,
            content,
        })
    }

    pub fn disconnect(&self, connection_id: ConnectionId) -> Result<(), ActorError> {
        self.send(RoomCommand::Disconnect { connection_id })
    }

    pub async fn snapshot(&self) -> Result<RoomSnapshot, ActorError> {
        let (reply, response) = oneshot::channel();
        self.send(RoomCommand::Snapshot { reply })?;
        response
            .await
            .map_err(|_| ActorError::RoomUnavailable(self.room_id.to_string()))
    }
}

struct Member {
    connection: ConnectionHandle,
    identity: Option<UserIdentity>,
}

enum Phase {
    Loading { deferred: Vec<RoomCommand> },
    Ready,
}

pub struct RoomSession {
    room_id: RoomId,
    instance: u64,
    members: HashMap<ConnectionId, Member>,
    history: VecDeque<ChatMessage>,
    phase: Phase,
    writer: mpsc::UnboundedSender<PersistRequest>,
    clock: Arc<dyn Clock>,
    config: RoomConfig,
    directory: RoomDirectory,
}

impl RoomSession {
    /// Start a session for `room_id` and begin backfilling its history.
    pub(super) fn spawn(
        room_id: RoomId,
        instance: u64,
        directory: RoomDirectory,
        store: Arc<dyn MessageStore>,
        clock: Arc<dyn Clock>,
        config: RoomConfig,
    ) -> RoomHandle {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = RoomHandle {
            room_id: room_id.clone(),
            instance,
            sender: sender.clone(),
        };

        let loader_store = store.clone();
        let loader_room = room_id.clone();
        tokio::spawn(async move {
            let messages = match loader_store.list_by_room(&loader_room).await {
                Ok(messages) => messages,
                Err(e) => {
                    tracing::warn!(
                        "Failed to load history for room {}; starting empty: {}",
                        loader_room,
                        e
                    );
                    Vec::new()
                }
            };
            // The session may already be gone; nothing to do then.
            let _ = sender.send(RoomCommand::HistoryLoaded(messages));
        });

        let session = Self {
            writer: spawn_writer(room_id.clone(), store),
            room_id,
            instance,
            members: HashMap::new(),
            history: VecDeque::new(),
            phase: Phase::Loading {
                deferred: Vec::new(),
            },
            clock,
            config,
            directory,
        };
        tokio::spawn(session.run(receiver));
        handle
    }

    async fn run(mut self, mut receiver: mpsc::UnboundedReceiver<RoomCommand>) {
        tracing::info!("Room {} session started", self.room_id);

        loop {
            let command = if self.is_idle() {
                match tokio::time::timeout(self.config.idle_grace, receiver.recv()).await {
                    Ok(command) => command,
                    Err(_) => {
                        self.flush_writes().await;
                        if self.try_evict(&receiver).await {
                            break;
                        }
                        continue;
                    }
                }
            } else {
                receiver.recv().await
            };

            match command {
                Some(command) => self.handle(command),
                None => break,
            }
        }

        tracing::info!("Room {} session stopped", self.room_id);
    }

    fn is_idle(&self) -> bool {
        self.members.is_empty() && matches!(self.phase, Phase::Ready)
    }

    /// Wait until every queued message has reached the store.
    ///
    /// A session started after eviction backfills from the store, so it must
    /// not miss writes still queued here.
    async fn flush_writes(&self) {
        let (done, flushed) = oneshot::channel();
        if self.writer.send(PersistRequest::Flush(done)).is_ok() {
            let _ = flushed.await;
        }
    }

    /// Remove this instance from the directory unless work arrived meanwhile.
    ///
    /// The directory lock is held while checking the mailbox, so no new handle
    /// can be handed out between the check and the removal. Commands sent on
    /// handles obtained earlier are dropped with the mailbox; `connect` callers
    /// see their ack fail and retry against a fresh instance.
    async fn try_evict(&self, receiver: &mpsc::UnboundedReceiver<RoomCommand>) -> bool {
        let mut rooms = self.directory.lock().await;
        if !receiver.is_empty() {
            return false;
        }
        if rooms
            .get(&self.room_id)
            .is_some_and(|handle| handle.instance() == self.instance)
        {
            rooms.remove(&self.room_id);
        }
        tracing::info!("Room {} evicted after idle grace period", self.room_id);
        true
    }

    fn handle(&mut self, command: RoomCommand) {
        let command = match command {
            RoomCommand::HistoryLoaded(messages) => {
                self.finish_loading(messages);
                return;
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
                return;
            }
            command => command,
        };

        if let Phase::Loading { deferred } = &mut self.phase {
            deferred.push(command);
            return;
        }

        match command {
            RoomCommand::Connect {
                connection,
                identity,
                ack,
            } => {
                self.connect(connection, identity);
                let _ = ack.send(());
            }
            RoomCommand::Receive {
                connection_id,
                identity,
                content,
            } => self.receive(connection_id, identity, content),
            RoomCommand::Disconnect { connection_id } => self.disconnect(connection_id),
            RoomCommand::Snapshot { .. } | RoomCommand::HistoryLoaded(_) => {}
        }
    }

    fn finish_loading(&mut self, messages: Vec<ChatMessage>) {
        let deferred = match std::mem::replace(&mut self.phase, Phase::Ready) {
            Phase::Loading { deferred } => deferred,
            Phase::Ready => {
                tracing::warn!("Room {} received history twice; ignoring", self.room_id);
                return;
            }
        };

        let skip = messages.len().saturating_sub(self.config.history_capacity);
        self.history = messages.into_iter().skip(skip).collect();
        tracing::debug!(
            "Room {} loaded {} messages; replaying {} deferred commands",
            self.room_id,
            self.history.len(),
            deferred.len()
        );

        for command in deferred {
            self.handle(command);
        }
    }

    fn connect(&mut self, connection: ConnectionHandle, identity: Option<UserIdentity>) {
        let history: Vec<ChatMessageDto> =
            self.history.iter().cloned().map(ChatMessageDto::from).collect();
        push_json(&connection, &HistoryMessage::new(history));

        tracing::info!(
            "Connection '{}' joined room {} ({} members)",
            connection.id(),
            self.room_id,
            self.members.len() + 1
        );
        self.members.insert(
            connection.id(),
            Member {
                connection,
                identity,
            },
        );
    }

    fn receive(
        &mut self,
        connection_id: ConnectionId,
        identity: Option<UserIdentity>,
        content: MessageContent,
    ) {
        let Some(member) = self.members.get_mut(&connection_id) else {
            tracing::warn!(
                "Ignoring message from '{}': not a member of room {}",
                connection_id,
                self.room_id
            );
            return;
        };
        if identity.is_some() {
            member.identity = identity;
        }
        let Some(sender) = member.identity.clone() else {
            tracing::warn!(
                "Ignoring message from '{}' in room {}: sender identity unknown",
                connection_id,
                self.room_id
            );
            return;
        };

        let message = ChatMessage::new(
            MessageIdFactory::generate(),
            self.room_id.clone(),
            &sender,
            content,
            Timestamp::new(self.clock.now_millis()),
        );

        self.history.push_back(message.clone());
        while self.history.len() > self.config.history_capacity {
            self.history.pop_front();
        }

        self.broadcast(&ChatBroadcastMessage::new(message.clone().into()));

        if self.writer.send(PersistRequest::Insert(message)).is_err() {
            tracing::warn!("Writer of room {} is gone; message not persisted", self.room_id);
        }
    }

    /// Push a frame to every member, dropping members whose connection is gone
    fn broadcast(&mut self, frame: &ChatBroadcastMessage) {
        let closed: Vec<ConnectionId> = self
            .members
            .iter()
            .filter(|(_, member)| !push_json(&member.connection, frame))
            .map(|(id, _)| *id)
            .collect();

        for connection_id in closed {
            tracing::debug!(
                "Removing closed connection '{}' from room {}",
                connection_id,
                self.room_id
            );
            self.members.remove(&connection_id);
        }
    }

    fn disconnect(&mut self, connection_id: ConnectionId) {
        if self.members.remove(&connection_id).is_some() {
            tracing::info!(
                "Connection '{}' left room {} ({} members)",
                connection_id,
                self.room_id,
                self.members.len()
            );
        }
    }

    fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.room_id.clone(),
            member_count: self.members.len(),
            history: self.history.iter().cloned().collect(),
        }
    }
}
