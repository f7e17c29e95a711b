//! UseCase: チャットルームでのメッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - メッセージが送信者を含む全メンバーに届くことを保証
//! - メッセージに含まれる identity が ConnectionRegistry にも記録されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：identity 付きのメッセージ送信
//! - 異常系：停止したルームセッションへの送信

use std::sync::Arc;

use crate::{
    actor::{ConnectionRegistry, RoomHandle},
    domain::{ConnectionId, MessageContent, UserIdentity},
};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// 接続 → アクターの対応表
    connections: Arc<ConnectionRegistry>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(connections: Arc<ConnectionRegistry>) -> Self {
        Self { connections }
    }

    /// メッセージ送信を実行
    ///
    /// ブロードキャストと永続化はルームセッションが行います。
    ///
    /// # Arguments
    ///
    /// * `room` - 送信先のルームセッション
    /// * `connection_id` - 送信者の接続 ID
    /// * `identity` - メッセージに含まれていたユーザー（省略可）
    /// * `content` - メッセージ内容（Domain Model）
    pub async fn execute(
        &self,
        room: &RoomHandle,
        connection_id: ConnectionId,
        identity: Option<UserIdentity>,
        content: MessageContent,
    ) -> Result<(), SendMessageError> {
        if let Some(identity) = &identity {
            self.connections
                .set_identity(connection_id, identity.clone())
                .await;
        }
        room.receive(connection_id, identity, content)?;
        Ok(())
    }
}
