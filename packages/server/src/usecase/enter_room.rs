//! UseCase: チャットルームへの入室処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - EnterRoomUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 入室した接続が ConnectionRegistry に Room の接続として記録されることを保証
//! - 入室直後に history が届くことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：identity 付き / identity なしの入室

use std::sync::Arc;

use tandem_shared::time::Clock;

use crate::{
    actor::{ActorAddress, ConnectionRegistry, RoomHandle, RoomRegistry},
    domain::{ConnectionHandle, RoomId, Timestamp, UserIdentity},
};

use super::error::EnterRoomError;

/// チャットルーム入室のユースケース
pub struct EnterRoomUseCase {
    /// Room ID → ルームセッションの対応表
    rooms: Arc<RoomRegistry>,
    /// 接続 → アクターの対応表
    connections: Arc<ConnectionRegistry>,
    clock: Arc<dyn Clock>,
}

impl EnterRoomUseCase {
    /// 新しい EnterRoomUseCase を作成
    pub fn new(
        rooms: Arc<RoomRegistry>,
        connections: Arc<ConnectionRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rooms,
            connections,
            clock,
        }
    }

    /// 入室を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - 入室する Room の ID（Domain Model）
    /// * `connection` - 入室する接続
    /// * `identity` - クエリで指定されたユーザー（省略可）
    ///
    /// # Returns
    ///
    /// * `Ok(RoomHandle)` - 入室したルームセッション（history は送信済み）
    /// * `Err(EnterRoomError)` - ルームセッションを起動できなかった
    pub async fn execute(
        &self,
        room_id: RoomId,
        connection: ConnectionHandle,
        identity: Option<UserIdentity>,
    ) -> Result<RoomHandle, EnterRoomError> {
        let connection_id = connection.id();
        self.connections
            .register(
                connection_id,
                ActorAddress::Room(room_id.clone()),
                identity.clone(),
                Timestamp::new(self.clock.now_millis()),
            )
            .await;

        match self.rooms.connect(&room_id, connection, identity).await {
            Ok(room) => Ok(room),
            Err(e) => {
                self.connections.unregister(connection_id).await;
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        actor::test_support::{connection, identity, next_frame},
        config::RoomConfig,
        infrastructure::{dto::websocket::HistoryMessage, store::InMemoryMessageStore},
    };
    use tandem_shared::time::FixedClock;

    fn create_usecase() -> (EnterRoomUseCase, Arc<ConnectionRegistry>) {
        let clock = Arc::new(FixedClock::new(1_000));
        let rooms = Arc::new(RoomRegistry::new(
            Arc::new(InMemoryMessageStore::new()),
            clock.clone(),
            RoomConfig::default(),
        ));
        let connections = Arc::new(ConnectionRegistry::new());
        (
            EnterRoomUseCase::new(rooms, connections.clone(), clock),
            connections,
        )
    }

    fn room_id() -> RoomId {
        RoomId::new("R".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_execute_registers_room_connection() {
        // テスト項目: 入室すると Room の接続として記録され、history が届く
        // given (前提条件):
        let (usecase, connections) = create_usecase();
        let (conn, mut rx) = connection();
        let conn_id = conn.id();

        // when (操作):
        let room = usecase
            .execute(room_id(), conn, Some(identity("u1")))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(room.room_id(), &room_id());
        let history: HistoryMessage = next_frame(&mut rx).await;
        assert!(history.messages.is_empty());
        let record = connections.lookup(conn_id).await.unwrap();
        assert_eq!(record.address, ActorAddress::Room(room_id()));
        assert_eq!(record.identity, Some(identity("u1")));
        assert_eq!(connections.counts().await.in_room, 1);
    }

    #[tokio::test]
    async fn test_execute_without_identity() {
        // テスト項目: identity なしでも入室できる
        // given (前提条件):
        let (usecase, connections) = create_usecase();
        let (conn, mut rx) = connection();
        let conn_id = conn.id();

        // when (操作):
        usecase.execute(room_id(), conn, None).await.unwrap();

        // then (期待する結果):
        let _: HistoryMessage = next_frame(&mut rx).await;
        let record = connections.lookup(conn_id).await.unwrap();
        assert!(record.identity.is_none());
    }
}
