//! UseCase: HTTP 経由のメッセージ保存処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SubmitMessageUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - WebSocket を経由しない保存経路でも履歴 API から読めることを保証
//! - ストアの書き込み失敗がエラーとして返ることを確認

use std::sync::Arc;

use tandem_shared::time::Clock;

use crate::domain::{
    ChatMessage, MessageContent, MessageIdFactory, MessageStore, RoomId, Timestamp, UserIdentity,
};

use super::error::SubmitMessageError;

/// メッセージ保存のユースケース
///
/// ストアへの書き込みのみを行い、ライブのルームセッションには配信しません。
pub struct SubmitMessageUseCase {
    store: Arc<dyn MessageStore>,
    clock: Arc<dyn Clock>,
}

impl SubmitMessageUseCase {
    /// 新しい SubmitMessageUseCase を作成
    pub fn new(store: Arc<dyn MessageStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// メッセージ保存を実行
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - 保存したメッセージ
    /// * `Err(SubmitMessageError)` - ストアへの書き込み失敗
    pub async fn execute(
        &self,
        room_id: RoomId,
        sender: UserIdentity,
        content: MessageContent,
    ) -> Result<ChatMessage, SubmitMessageError> {
        let message = ChatMessage::new(
            MessageIdFactory::generate(),
            room_id,
            &sender,
            content,
            Timestamp::new(self.clock.now_millis()),
        );
        self.store.insert_message(message.clone()).await?;
        tracing::debug!("Stored message {} in room {}", message.id.as_str(), message.room_id);
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{DisplayName, MockMessageStore, StoreError, UserId},
        infrastructure::store::InMemoryMessageStore,
    };
    use tandem_shared::time::FixedClock;

    fn sender() -> UserIdentity {
        UserIdentity::new(
            UserId::new("u1".to_string()).unwrap(),
            DisplayName::new("Alice".to_string()).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_execute_stores_message() {
        // テスト項目: 保存したメッセージがストアから読める
        // given (前提条件):
        let store = Arc::new(InMemoryMessageStore::new());
        let usecase = SubmitMessageUseCase::new(store.clone(), Arc::new(FixedClock::new(42)));
        let room_id = RoomId::new("R".to_string()).unwrap();

        // when (操作):
        let message = usecase
            .execute(
                room_id.clone(),
                sender(),
                MessageContent::new("hello".to_string()).unwrap(),
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(message.created_at, Timestamp::new(42));
        let stored = store.list_by_room(&room_id).await.unwrap();
        assert_eq!(stored, vec![message]);
    }

    #[tokio::test]
    async fn test_execute_store_failure() {
        // テスト項目: ストアへの書き込みに失敗するとエラーを返す
        // given (前提条件):
        let mut store = MockMessageStore::new();
        store
            .expect_insert_message()
            .returning(|_| Err(StoreError::Unavailable("down".to_string())));
        let usecase = SubmitMessageUseCase::new(Arc::new(store), Arc::new(FixedClock::new(42)));

        // when (操作):
        let result = usecase
            .execute(
                RoomId::new("R".to_string()).unwrap(),
                sender(),
                MessageContent::new("hello".to_string()).unwrap(),
            )
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(SubmitMessageError::StoreFailed(_))));
    }
}
