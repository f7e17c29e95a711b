//! Waiting-room coordinator.
//!
//! A single actor owns the FIFO queue of clients waiting for a partner. The
//! queue is only ever touched from the actor task, so joins, leaves, pairings
//! and idle expiry are applied one at a time in mailbox order.

use std::{collections::VecDeque, sync::Arc};

use tandem_shared::time::Clock;
use tokio::sync::{mpsc, oneshot};

use crate::{
    config::CoordinatorConfig,
    domain::{
        ConnectionHandle, ConnectionId, MessageStore, PairingRecord, RoomIdFactory, Timestamp,
        UserIdentity,
    },
    infrastructure::dto::websocket::{PairedMessage, WaitingMessage},
};

use super::{error::ActorError, push_json};

/// Commands accepted by the coordinator mailbox
#[derive(Debug)]
pub enum CoordinatorCommand {
    Join {
        identity: UserIdentity,
        connection: ConnectionHandle,
    },
    Leave {
        connection_id: ConnectionId,
    },
    /// Any inbound traffic on a waiting connection
    Touch {
        connection_id: ConnectionId,
    },
    WaitingCount {
        reply: oneshot::Sender<usize>,
    },
}

/// Address of the coordinator actor
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    sender: mpsc::UnboundedSender<CoordinatorCommand>,
}

impl CoordinatorHandle {
    fn send(&self, command: CoordinatorCommand) -> Result<(), ActorError> {
        self.sender
            .send(command)
            .map_err(|_| ActorError::CoordinatorUnavailable)
    }

    pub fn join(
        &self,
        identity: UserIdentity,
        connection: ConnectionHandle,
    ) -> Result<(), ActorError> {
        self.send(CoordinatorCommand::Join {
            identity,
            connection,
        })
    }

    pub fn leave(&self, connection_id: ConnectionId) -> Result<(), ActorError> {
        self.send(CoordinatorCommand::Leave { connection_id })
    }

    pub fn touch(&self, connection_id: ConnectionId) -> Result<(), ActorError> {
        self.send(CoordinatorCommand::Touch { connection_id })
    }

    /// Number of entries currently queued
    pub async fn waiting_count(&self) -> Result<usize, ActorError> {
        let (reply, response) = oneshot::channel();
        self.send(CoordinatorCommand::WaitingCount { reply })?;
        response.await.map_err(|_| ActorError::CoordinatorUnavailable)
    }
}

struct WaitingEntry {
    identity: UserIdentity,
    connection: ConnectionHandle,
    joined_at: Timestamp,
    last_activity_at: Timestamp,
}

/// Human-readable status shown next to the queue position
fn waiting_status_message(position: usize) -> String {
    match position {
        1 => "Looking for a chat partner... you are next in line.".to_string(),
        n => format!("Looking for a chat partner... {} people ahead of you.", n - 1),
    }
}

pub struct WaitingCoordinator {
    queue: VecDeque<WaitingEntry>,
    store: Arc<dyn MessageStore>,
    clock: Arc<dyn Clock>,
    config: CoordinatorConfig,
}

impl WaitingCoordinator {
    /// Start the coordinator task and return its handle.
    ///
    /// The task runs until every handle has been dropped.
    pub fn spawn(
        store: Arc<dyn MessageStore>,
        clock: Arc<dyn Clock>,
        config: CoordinatorConfig,
    ) -> CoordinatorHandle {
        let (sender, receiver) = mpsc::unbounded_channel();
        let coordinator = Self {
            queue: VecDeque::new(),
            store,
            clock,
            config,
        };
        tokio::spawn(coordinator.run(receiver));
        CoordinatorHandle { sender }
    }

    async fn run(mut self, mut receiver: mpsc::UnboundedReceiver<CoordinatorCommand>) {
        tracing::info!("Waiting coordinator started");
        let mut sweep = tokio::time::interval(self.config.sweep_interval);
        sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                command = receiver.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                _ = sweep.tick() => self.expire_idle_entries(),
            }
        }

        tracing::info!("Waiting coordinator stopped");
    }

    fn handle(&mut self, command: CoordinatorCommand) {
        match command {
            CoordinatorCommand::Join {
                identity,
                connection,
            } => self.join(identity, connection),
            CoordinatorCommand::Leave { connection_id } => self.leave(connection_id),
            CoordinatorCommand::Touch { connection_id } => self.touch(connection_id),
            CoordinatorCommand::WaitingCount { reply } => {
                let _ = reply.send(self.queue.len());
            }
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    fn index_of(&self, connection_id: ConnectionId) -> Option<usize> {
        self.queue
            .iter()
            .position(|entry| entry.connection.id() == connection_id)
    }

    fn join(&mut self, identity: UserIdentity, connection: ConnectionHandle) {
        // Same connection joining twice: just repeat its status.
        if let Some(index) = self.index_of(connection.id()) {
            tracing::debug!(
                "Connection '{}' is already waiting; re-sending status",
                connection.id()
            );
            let position = index + 1;
            push_json(
                &connection,
                &WaitingMessage::new(position, Some(waiting_status_message(position))),
            );
            return;
        }

        // One queue slot per user id; the newer connection wins.
        if let Some(index) = self
            .queue
            .iter()
            .position(|entry| entry.identity.id == identity.id)
            && let Some(stale) = self.queue.remove(index)
        {
            tracing::info!(
                "User '{}' rejoined on a new connection; dropping stale entry",
                identity.id.as_str()
            );
            stale.connection.close();
            self.recompute_positions();
        }

        self.drop_closed_entries();

        let now = self.now();
        let entrant = WaitingEntry {
            identity,
            connection,
            joined_at: now,
            last_activity_at: now,
        };

        match self.queue.pop_front() {
            Some(partner) => {
                self.pair(partner, entrant);
                self.recompute_positions();
            }
            None => {
                tracing::info!(
                    "User '{}' is waiting for a partner",
                    entrant.identity.id.as_str()
                );
                push_json(
                    &entrant.connection,
                    &WaitingMessage::new(1, Some(waiting_status_message(1))),
                );
                self.queue.push_back(entrant);
            }
        }
    }

    fn leave(&mut self, connection_id: ConnectionId) {
        if let Some(index) = self.index_of(connection_id)
            && let Some(entry) = self.queue.remove(index)
        {
            tracing::info!(
                "User '{}' left the waiting room after {} ms",
                entry.identity.id.as_str(),
                self.now().value() - entry.joined_at.value()
            );
            self.recompute_positions();
        }
    }

    fn touch(&mut self, connection_id: ConnectionId) {
        let now = self.now();
        if let Some(entry) = self
            .queue
            .iter_mut()
            .find(|entry| entry.connection.id() == connection_id)
        {
            entry.last_activity_at = now;
        }
    }

    /// Pair the oldest waiting entry with the newcomer.
    ///
    /// Both parties are notified right away. The pairing record is persisted in a
    /// detached task, which closes the two waiting connections once the write has
    /// finished (or failed).
    fn pair(&mut self, waiting: WaitingEntry, entrant: WaitingEntry) {
        let room_id = RoomIdFactory::generate();
        let record = PairingRecord {
            room_id: room_id.clone(),
            user_a: waiting.identity.clone(),
            user_b: entrant.identity.clone(),
            paired_at: self.now(),
        };

        tracing::info!(
            "Paired '{}' with '{}' in room {}",
            waiting.identity.id.as_str(),
            entrant.identity.id.as_str(),
            room_id
        );

        push_json(
            &waiting.connection,
            &PairedMessage::new(
                room_id.as_str().to_string(),
                entrant.identity.display_name.as_str().to_string(),
            ),
        );
        push_json(
            &entrant.connection,
            &PairedMessage::new(
                room_id.as_str().to_string(),
                waiting.identity.display_name.as_str().to_string(),
            ),
        );

        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(e) = store.insert_pairing(record).await {
                tracing::warn!("Failed to persist pairing for room {}: {}", room_id, e);
            }
            waiting.connection.close();
            entrant.connection.close();
        });
    }

    /// Forget entries whose socket closed before their `Leave` arrived
    fn drop_closed_entries(&mut self) {
        let before = self.queue.len();
        self.queue.retain(|entry| !entry.connection.is_closed());
        if self.queue.len() != before {
            tracing::debug!(
                "Dropped {} closed waiting entries",
                before - self.queue.len()
            );
            self.recompute_positions();
        }
    }

    /// Tell every queued entry its 1-based rank by join time
    fn recompute_positions(&self) {
        for (index, entry) in self.queue.iter().enumerate() {
            let position = index + 1;
            push_json(
                &entry.connection,
                &WaitingMessage::new(position, Some(waiting_status_message(position))),
            );
        }
    }

    fn expire_idle_entries(&mut self) {
        let now = self.now().value();
        let timeout = i64::try_from(self.config.idle_timeout.as_millis()).unwrap_or(i64::MAX);
        let before = self.queue.len();

        self.queue.retain(|entry| {
            let idle = now.saturating_sub(entry.last_activity_at.value()) >= timeout;
            if idle {
                tracing::info!(
                    "Dropping idle waiting entry for '{}'",
                    entry.identity.id.as_str()
                );
                entry.connection.close();
            }
            !idle
        });

        if self.queue.len() != before {
            self.recompute_positions();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        actor::test_support::{connection, identity, next_frame, next_push},
        domain::{MockMessageStore, PushMessage, StoreError},
        infrastructure::{dto::websocket::MessageType, store::InMemoryMessageStore},
    };
    use tandem_shared::time::FixedClock;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 到着順（FIFO）でのペアリング
    // - 待機位置の通知と再計算
    // - 同一ユーザーの再参加、アイドル切断、永続化失敗時の挙動
    //
    // 【なぜこのテストが必要か】
    // - マッチングの公平性は到着順の厳密な維持に依存する
    // - 永続化はベストエフォートであり、失敗してもペアリングは成立しなければならない
    // ========================================

    fn spawn_coordinator() -> (CoordinatorHandle, Arc<InMemoryMessageStore>, Arc<FixedClock>) {
        let store = Arc::new(InMemoryMessageStore::new());
        let clock = Arc::new(FixedClock::new(1_000));
        let handle = WaitingCoordinator::spawn(
            store.clone(),
            clock.clone(),
            CoordinatorConfig::default(),
        );
        (handle, store, clock)
    }

    #[tokio::test]
    async fn test_solitary_client_waits_at_position_one() {
        // テスト項目: 1 人目のクライアントは position 1 の waiting を受け取り、ペアリングされない
        // given (前提条件):
        let (coordinator, _store, _clock) = spawn_coordinator();
        let (conn, mut rx) = connection();

        // when (操作):
        coordinator.join(identity("u1"), conn).unwrap();

        // then (期待する結果):
        let frame: WaitingMessage = next_frame(&mut rx).await;
        assert_eq!(frame.r#type, MessageType::Waiting);
        assert_eq!(frame.position, 1);
        assert!(frame.message.is_some());
        assert_eq!(coordinator.waiting_count().await.unwrap(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_second_client_pairs_with_first() {
        // テスト項目: 2 人目の参加で両者に同じ roomId の paired が届き、接続が閉じられる
        // given (前提条件):
        let (coordinator, store, _clock) = spawn_coordinator();
        let (conn1, mut rx1) = connection();
        let (conn2, mut rx2) = connection();
        coordinator.join(identity("u1"), conn1).unwrap();
        let _: WaitingMessage = next_frame(&mut rx1).await;

        // when (操作):
        coordinator.join(identity("u2"), conn2).unwrap();

        // then (期待する結果):
        let paired1: PairedMessage = next_frame(&mut rx1).await;
        let paired2: PairedMessage = next_frame(&mut rx2).await;
        assert_eq!(paired1.room_id, paired2.room_id);
        assert_eq!(paired1.partner_name, "User-u2");
        assert_eq!(paired2.partner_name, "User-u1");
        assert_eq!(next_push(&mut rx1).await, PushMessage::Close);
        assert_eq!(next_push(&mut rx2).await, PushMessage::Close);

        // 永続化が完了してから接続が閉じられる
        let pairings = store.list_recent_pairings(10).await.unwrap();
        assert_eq!(pairings.len(), 1);
        assert_eq!(pairings[0].room_id.as_str(), paired1.room_id);
        assert_eq!(pairings[0].user_a, identity("u1"));
        assert_eq!(pairings[0].user_b, identity("u2"));
        assert_eq!(coordinator.waiting_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_pairs_strictly_in_arrival_order() {
        // テスト項目: 1-2 番目、3-4 番目の参加者がそれぞれペアになる
        // given (前提条件):
        let (coordinator, _store, _clock) = spawn_coordinator();
        let mut receivers = Vec::new();

        // when (操作):
        for id in ["u1", "u2", "u3", "u4"] {
            let (conn, rx) = connection();
            coordinator.join(identity(id), conn).unwrap();
            receivers.push(rx);
        }

        // then (期待する結果):
        let mut rooms = Vec::new();
        for (index, rx) in receivers.iter_mut().enumerate() {
            // 奇数番目の参加者は先に waiting を受け取る
            if index % 2 == 0 {
                let waiting: WaitingMessage = next_frame(rx).await;
                assert_eq!(waiting.position, 1);
            }
            let paired: PairedMessage = next_frame(rx).await;
            rooms.push(paired.room_id);
        }
        assert_eq!(rooms[0], rooms[1]);
        assert_eq!(rooms[2], rooms[3]);
        assert_ne!(rooms[0], rooms[2]);
    }

    #[tokio::test]
    async fn test_leave_recomputes_positions() {
        // テスト項目: 待機中のクライアントが抜けると、後続の位置が 1 ずつ繰り上がる
        // given (前提条件):
        // 直接キューを組み立てるため、アクターを起動せずに状態を操作する
        let clock = Arc::new(FixedClock::new(1_000));
        let mut coordinator = WaitingCoordinator {
            queue: VecDeque::new(),
            store: Arc::new(InMemoryMessageStore::new()),
            clock,
            config: CoordinatorConfig::default(),
        };
        let mut receivers = Vec::new();
        let mut ids = Vec::new();
        for id in ["u1", "u2", "u3"] {
            let (conn, rx) = connection();
            ids.push(conn.id());
            coordinator.queue.push_back(WaitingEntry {
                identity: identity(id),
                connection: conn,
                joined_at: Timestamp::new(1_000),
                last_activity_at: Timestamp::new(1_000),
            });
            receivers.push(rx);
        }

        // when (操作):
        coordinator.leave(ids[0]);

        // then (期待する結果):
        assert!(receivers[0].try_recv().is_err());
        let second: WaitingMessage = next_frame(&mut receivers[1]).await;
        let third: WaitingMessage = next_frame(&mut receivers[2]).await;
        assert_eq!(second.position, 1);
        assert_eq!(third.position, 2);
        assert_eq!(coordinator.queue.len(), 2);
    }

    #[tokio::test]
    async fn test_leave_unknown_connection_is_noop() {
        // テスト項目: キューにない接続の leave は何も変更しない
        // given (前提条件):
        let (coordinator, _store, _clock) = spawn_coordinator();
        let (conn, mut rx) = connection();
        coordinator.join(identity("u1"), conn).unwrap();
        let _: WaitingMessage = next_frame(&mut rx).await;
        let (other, _other_rx) = connection();

        // when (操作):
        coordinator.leave(other.id()).unwrap();

        // then (期待する結果):
        assert_eq!(coordinator.waiting_count().await.unwrap(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_disconnected_client_is_not_paired() {
        // テスト項目: 切断したクライアントはキューから外れ、次の参加者とペアにならない
        // given (前提条件):
        let (coordinator, _store, _clock) = spawn_coordinator();
        let (conn1, mut rx1) = connection();
        let conn1_id = conn1.id();
        coordinator.join(identity("u1"), conn1).unwrap();
        let _: WaitingMessage = next_frame(&mut rx1).await;
        coordinator.leave(conn1_id).unwrap();

        // when (操作):
        let (conn2, mut rx2) = connection();
        coordinator.join(identity("u2"), conn2).unwrap();

        // then (期待する結果):
        let waiting: WaitingMessage = next_frame(&mut rx2).await;
        assert_eq!(waiting.position, 1);
        assert_eq!(coordinator.waiting_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_closed_connection_is_not_paired_before_leave_arrives() {
        // テスト項目: Leave が届く前でも、ソケットが閉じたエントリとはペアにならない
        // given (前提条件):
        let (coordinator, _store, _clock) = spawn_coordinator();
        let (conn1, mut rx1) = connection();
        coordinator.join(identity("u1"), conn1).unwrap();
        let _: WaitingMessage = next_frame(&mut rx1).await;
        drop(rx1);

        // when (操作):
        let (conn2, mut rx2) = connection();
        coordinator.join(identity("u2"), conn2).unwrap();

        // then (期待する結果):
        let waiting: WaitingMessage = next_frame(&mut rx2).await;
        assert_eq!(waiting.position, 1);
        assert_eq!(coordinator.waiting_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_join_on_same_connection_resends_status() {
        // テスト項目: 同じ接続からの二重 join は現在の状態を再送するだけ
        // given (前提条件):
        let (coordinator, _store, _clock) = spawn_coordinator();
        let (conn, mut rx) = connection();
        coordinator.join(identity("u1"), conn.clone()).unwrap();
        let _: WaitingMessage = next_frame(&mut rx).await;

        // when (操作):
        coordinator.join(identity("u1"), conn).unwrap();

        // then (期待する結果):
        let frame: WaitingMessage = next_frame(&mut rx).await;
        assert_eq!(frame.position, 1);
        assert_eq!(coordinator.waiting_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rejoin_with_same_user_replaces_stale_entry() {
        // テスト項目: 同じユーザーが別接続で再参加すると古いエントリが閉じられ、自分自身とはペアにならない
        // given (前提条件):
        let (coordinator, _store, _clock) = spawn_coordinator();
        let (old_conn, mut old_rx) = connection();
        coordinator.join(identity("u1"), old_conn).unwrap();
        let _: WaitingMessage = next_frame(&mut old_rx).await;

        // when (操作):
        let (new_conn, mut new_rx) = connection();
        coordinator.join(identity("u1"), new_conn).unwrap();

        // then (期待する結果):
        assert_eq!(next_push(&mut old_rx).await, PushMessage::Close);
        let frame: WaitingMessage = next_frame(&mut new_rx).await;
        assert_eq!(frame.position, 1);
        assert_eq!(coordinator.waiting_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rejoin_pairs_with_waiting_partner_not_itself() {
        // テスト項目: 再接続したクライアントは以前の位置を引き継がず、待機中の他ユーザーとペアになる
        // given (前提条件):
        let clock = Arc::new(FixedClock::new(1_000));
        let mut coordinator = WaitingCoordinator {
            queue: VecDeque::new(),
            store: Arc::new(InMemoryMessageStore::new()),
            clock,
            config: CoordinatorConfig::default(),
        };
        let (conn_a, _rx_a) = connection();
        let (conn_b, _rx_b) = connection();
        coordinator.queue.push_back(WaitingEntry {
            identity: identity("a"),
            connection: conn_a,
            joined_at: Timestamp::new(1_000),
            last_activity_at: Timestamp::new(1_000),
        });
        coordinator.queue.push_back(WaitingEntry {
            identity: identity("b"),
            connection: conn_b,
            joined_at: Timestamp::new(1_000),
            last_activity_at: Timestamp::new(1_000),
        });

        // when (操作): a が新しい接続で再参加する（b が待っているので a は b とペアになる）
        let (conn_a2, mut rx_a2) = connection();
        coordinator.join(identity("a"), conn_a2);

        // then (期待する結果):
        let paired: PairedMessage = next_frame(&mut rx_a2).await;
        assert_eq!(paired.partner_name, "User-b");
        assert!(coordinator.queue.is_empty());
    }

    #[tokio::test]
    async fn test_idle_entry_is_dropped() {
        // テスト項目: 一定時間アクティビティのない待機エントリは削除され接続が閉じられる
        // given (前提条件):
        let store = Arc::new(InMemoryMessageStore::new());
        let clock = Arc::new(FixedClock::new(1_000));
        let coordinator = WaitingCoordinator::spawn(
            store,
            clock.clone(),
            CoordinatorConfig {
                idle_timeout: Duration::from_secs(60),
                sweep_interval: Duration::from_millis(10),
            },
        );
        let (conn, mut rx) = connection();
        coordinator.join(identity("u1"), conn).unwrap();
        let _: WaitingMessage = next_frame(&mut rx).await;

        // when (操作):
        clock.advance(61_000);

        // then (期待する結果):
        assert_eq!(next_push(&mut rx).await, PushMessage::Close);
        assert_eq!(coordinator.waiting_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_touch_keeps_entry_alive() {
        // テスト項目: アクティビティのあるエントリはアイドル切断されない
        // given (前提条件):
        let clock = Arc::new(FixedClock::new(1_000));
        let mut coordinator = WaitingCoordinator {
            queue: VecDeque::new(),
            store: Arc::new(InMemoryMessageStore::new()),
            clock: clock.clone(),
            config: CoordinatorConfig::default(),
        };
        let (conn, mut rx) = connection();
        let id = conn.id();
        coordinator.join(identity("u1"), conn);
        let _: WaitingMessage = next_frame(&mut rx).await;

        // when (操作):
        clock.advance(45_000);
        coordinator.touch(id);
        clock.advance(45_000);
        coordinator.expire_idle_entries();

        // then (期待する結果):
        assert_eq!(coordinator.queue.len(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_pairing_proceeds_when_persistence_fails() {
        // テスト項目: ペアリング記録の保存に失敗してもペアリングは成立する
        // given (前提条件):
        let mut store = MockMessageStore::new();
        store
            .expect_insert_pairing()
            .times(1)
            .returning(|_| Err(StoreError::Unavailable("database is down".to_string())));
        let coordinator = WaitingCoordinator::spawn(
            Arc::new(store),
            Arc::new(FixedClock::new(1_000)),
            CoordinatorConfig::default(),
        );
        let (conn1, mut rx1) = connection();
        let (conn2, mut rx2) = connection();

        // when (操作):
        coordinator.join(identity("u1"), conn1).unwrap();
        coordinator.join(identity("u2"), conn2).unwrap();

        // then (期待する結果):
        let _: WaitingMessage = next_frame(&mut rx1).await;
        let paired1: PairedMessage = next_frame(&mut rx1).await;
        let paired2: PairedMessage = next_frame(&mut rx2).await;
        assert_eq!(paired1.room_id, paired2.room_id);
        assert_eq!(next_push(&mut rx1).await, PushMessage::Close);
        assert_eq!(next_push(&mut rx2).await, PushMessage::Close);
    }
}
