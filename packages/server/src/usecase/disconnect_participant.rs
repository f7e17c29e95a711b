//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - ConnectionRegistry の記録に基づく切断の振り分け
//!
//! ### なぜこのテストが必要か
//! - 待合室の接続はコーディネーターから、Room の接続はルームセッションから外れることを保証
//! - 同じ接続を 2 回切断しても問題ないこと（冪等性）を確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：待合室 / Room の接続の切断
//! - エッジケース：未登録の接続の切断

use std::sync::Arc;

use crate::{
    actor::{ActorAddress, ConnectionRecord, ConnectionRegistry, CoordinatorHandle, RoomRegistry},
    domain::ConnectionId,
};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// 接続 → アクターの対応表
    connections: Arc<ConnectionRegistry>,
    /// 待合室のコーディネーター（アクター）
    coordinator: CoordinatorHandle,
    /// Room ID → ルームセッションの対応表
    rooms: Arc<RoomRegistry>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(
        connections: Arc<ConnectionRegistry>,
        coordinator: CoordinatorHandle,
        rooms: Arc<RoomRegistry>,
    ) -> Self {
        Self {
            connections,
            coordinator,
            rooms,
        }
    }

    /// 参加者切断を実行
    ///
    /// # Returns
    ///
    /// * `Some(ConnectionRecord)` - 切断した接続の記録
    /// * `None` - 未登録の接続（切断済み）
    pub async fn execute(&self, connection_id: ConnectionId) -> Option<ConnectionRecord> {
        let record = self.connections.unregister(connection_id).await?;

        match &record.address {
            ActorAddress::Coordinator => {
                if let Err(e) = self.coordinator.leave(connection_id) {
                    tracing::warn!("Failed to remove '{}' from waiting room: {}", connection_id, e);
                }
            }
            ActorAddress::Room(room_id) => {
                // An evicted room has already forgotten the member.
                if let Some(room) = self.rooms.get(room_id).await
                    && let Err(e) = room.disconnect(connection_id)
                {
                    tracing::debug!("Room {} stopped before disconnect: {}", room_id, e);
                }
            }
        }

        Some(record)
    }
}
