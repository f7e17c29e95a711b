//! UseCase: メッセージ履歴取得処理

use std::sync::Arc;

use crate::domain::{ChatMessage, MessageStore, RoomId};

use super::error::GetRoomHistoryError;

/// メッセージ履歴取得のユースケース
///
/// ライブのルームセッションではなくストアから読み出します。
pub struct GetRoomHistoryUseCase {
    store: Arc<dyn MessageStore>,
}

impl GetRoomHistoryUseCase {
    /// 新しい GetRoomHistoryUseCase を作成
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// Room のメッセージを作成日時の昇順で取得
    pub async fn execute(&self, room_id: &RoomId) -> Result<Vec<ChatMessage>, GetRoomHistoryError> {
        Ok(self.store.list_by_room(room_id).await?)
    }
}
