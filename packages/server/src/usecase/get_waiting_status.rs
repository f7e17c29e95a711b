//! UseCase: 待合室の状態取得処理

use std::sync::Arc;

use crate::actor::{ConnectionRegistry, CoordinatorHandle};

use super::error::GetWaitingStatusError;

/// 待合室と接続数の集計
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitingStatus {
    /// キューに並んでいるエントリー数
    pub waiting_count: usize,
    /// 待合室の WebSocket 接続数
    pub waiting_connections: usize,
    /// チャットルームの WebSocket 接続数
    pub room_connections: usize,
}

/// 待合室の状態取得のユースケース
pub struct GetWaitingStatusUseCase {
    coordinator: CoordinatorHandle,
    connections: Arc<ConnectionRegistry>,
}

impl GetWaitingStatusUseCase {
    /// 新しい GetWaitingStatusUseCase を作成
    pub fn new(coordinator: CoordinatorHandle, connections: Arc<ConnectionRegistry>) -> Self {
        Self {
            coordinator,
            connections,
        }
    }

    pub async fn execute(&self) -> Result<WaitingStatus, GetWaitingStatusError> {
        let waiting_count = self.coordinator.waiting_count().await?;
        let counts = self.connections.counts().await;
        Ok(WaitingStatus {
            waiting_count,
            waiting_connections: counts.waiting,
            room_connections: counts.in_room,
        })
    }
}
