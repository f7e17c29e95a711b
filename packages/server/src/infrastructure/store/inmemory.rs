//! InMemory MessageStore 実装
//!
//! ドメイン層が定義する MessageStore trait の具体的な実装。
//! Vec を追記専用ログとして使用します。プロセス終了で内容は失われます。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ChatMessage, MessageStore, PairingRecord, RoomId, StoreError};

/// インメモリ MessageStore 実装
#[derive(Default)]
pub struct InMemoryMessageStore {
    /// 追加順のチャットメッセージ
    messages: Mutex<Vec<ChatMessage>>,
    /// 追加順のペアリング記録
    pairings: Mutex<Vec<PairingRecord>>,
}

impl InMemoryMessageStore {
    /// 新しい InMemoryMessageStore を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn insert_message(&self, message: ChatMessage) -> Result<(), StoreError> {
        let mut messages = self.messages.lock().await;
        messages.push(message);
        Ok(())
    }

    async fn list_by_room(&self, room_id: &RoomId) -> Result<Vec<ChatMessage>, StoreError> {
        let messages = self.messages.lock().await;
        let mut room_messages: Vec<ChatMessage> = messages
            .iter()
            .filter(|m| &m.room_id == room_id)
            .cloned()
            .collect();
        // 安定ソートなので同一時刻のメッセージは追加順を保つ
        room_messages.sort_by_key(|m| m.created_at);
        Ok(room_messages)
    }

    async fn insert_pairing(&self, record: PairingRecord) -> Result<(), StoreError> {
        let mut pairings = self.pairings.lock().await;
        pairings.push(record);
        Ok(())
    }

    async fn list_recent_pairings(&self, limit: usize) -> Result<Vec<PairingRecord>, StoreError> {
        let pairings = self.pairings.lock().await;
        let mut recent: Vec<PairingRecord> = pairings.iter().rev().cloned().collect();
        recent.sort_by(|a, b| b.paired_at.cmp(&a.paired_at));
        recent.truncate(limit);
        Ok(recent)
    }

    async fn list_rooms(&self) -> Result<Vec<RoomId>, StoreError> {
        let messages = self.messages.lock().await;
        let mut rooms: Vec<RoomId> = Vec::new();
        for message in messages.iter() {
            if !rooms.contains(&message.room_id) {
                rooms.push(message.room_id.clone());
            }
        }
        Ok(rooms)
    }
}
