//! MessageStore trait 定義
//!
//! チャットメッセージとペアリング記録の永続化インターフェース。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ライブ配信の正しさはこのストアに依存しません。呼び出し側は書き込み失敗を
//! ログに残すだけで、配信やペアリングを止めてはいけません。

use async_trait::async_trait;

use super::{ChatMessage, PairingRecord, RoomId, StoreError};

/// Append-only store for chat messages and pairing records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// メッセージを追加
    async fn insert_message(&self, message: ChatMessage) -> Result<(), StoreError>;

    /// Room のメッセージを作成日時の昇順で取得
    async fn list_by_room(&self, room_id: &RoomId) -> Result<Vec<ChatMessage>, StoreError>;

    /// ペアリング記録を追加
    async fn insert_pairing(&self, record: PairingRecord) -> Result<(), StoreError>;

    /// 直近のペアリング記録を新しい順に最大 `limit` 件取得
    async fn list_recent_pairings(&self, limit: usize) -> Result<Vec<PairingRecord>, StoreError>;

    /// メッセージが存在する Room の ID 一覧を取得
    async fn list_rooms(&self) -> Result<Vec<RoomId>, StoreError>;
}
