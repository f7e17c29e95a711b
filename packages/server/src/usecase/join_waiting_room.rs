//! UseCase: 待合室への参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinWaitingRoomUseCase の register / execute / touch メソッド
//!
//! ### なぜこのテストが必要か
//! - 待合室の接続が ConnectionRegistry に記録され、切断時に正しく振り分けられることを保証
//! - join で報告された identity が記録されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続登録 → join → 待機順の通知
//! - 正常系：2 人目の join でペアリングされる

use std::sync::Arc;

use tandem_shared::time::Clock;

use crate::{
    actor::{ActorAddress, ConnectionRegistry, CoordinatorHandle},
    domain::{ConnectionHandle, ConnectionId, Timestamp, UserIdentity},
};

use super::error::JoinWaitingRoomError;

/// 待合室参加のユースケース
pub struct JoinWaitingRoomUseCase {
    /// 待合室のコーディネーター（アクター）
    coordinator: CoordinatorHandle,
    /// 接続 → アクターの対応表
    connections: Arc<ConnectionRegistry>,
    clock: Arc<dyn Clock>,
}

impl JoinWaitingRoomUseCase {
    /// 新しい JoinWaitingRoomUseCase を作成
    pub fn new(
        coordinator: CoordinatorHandle,
        connections: Arc<ConnectionRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            coordinator,
            connections,
            clock,
        }
    }

    /// 待合室への WebSocket 接続を登録
    ///
    /// join メッセージを受け取る前から待合室の接続として数えられます。
    pub async fn register(&self, connection_id: ConnectionId) {
        self.connections
            .register(
                connection_id,
                ActorAddress::Coordinator,
                None,
                Timestamp::new(self.clock.now_millis()),
            )
            .await;
    }

    /// 待合室への参加を実行
    ///
    /// # Arguments
    ///
    /// * `identity` - join メッセージで報告されたユーザー（Domain Model）
    /// * `connection` - 参加する接続
    ///
    /// # Returns
    ///
    /// * `Ok(())` - コーディネーターが参加を受け付けた
    /// * `Err(JoinWaitingRoomError)` - コーディネーターが停止している
    pub async fn execute(
        &self,
        identity: UserIdentity,
        connection: ConnectionHandle,
    ) -> Result<(), JoinWaitingRoomError> {
        self.connections
            .set_identity(connection.id(), identity.clone())
            .await;
        self.coordinator.join(identity, connection)?;
        Ok(())
    }

    /// 待合室の接続でフレームを受信したことを記録
    pub fn touch(&self, connection_id: ConnectionId) -> Result<(), JoinWaitingRoomError> {
        self.coordinator.touch(connection_id)?;
        Ok(())
    }
}
