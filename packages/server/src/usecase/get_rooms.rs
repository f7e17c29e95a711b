//! UseCase: ルーム一覧取得処理

use std::sync::Arc;

use crate::domain::{MessageStore, RoomId};

use super::error::GetRoomsError;

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    store: Arc<dyn MessageStore>,
}

impl GetRoomsUseCase {
    /// 新しい GetRoomsUseCase を作成
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// メッセージが保存されている Room の ID 一覧を取得
    pub async fn execute(&self) -> Result<Vec<RoomId>, GetRoomsError> {
        Ok(self.store.list_rooms().await?)
    }
}
