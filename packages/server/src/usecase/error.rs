//! UseCase 層のエラー型

use thiserror::Error;

use crate::{actor::ActorError, domain::StoreError};

/// 待合室への参加エラー
#[derive(Debug, Error)]
pub enum JoinWaitingRoomError {
    #[error("waiting room is unavailable: {0}")]
    CoordinatorUnavailable(#[from] ActorError),
}

/// チャットルームへの入室エラー
#[derive(Debug, Error)]
pub enum EnterRoomError {
    #[error("chat room is unavailable: {0}")]
    RoomUnavailable(#[from] ActorError),
}

/// チャットルームでのメッセージ送信エラー
#[derive(Debug, Error)]
pub enum SendMessageError {
    #[error("chat room is unavailable: {0}")]
    RoomUnavailable(#[from] ActorError),
}

/// HTTP 経由のメッセージ保存エラー
#[derive(Debug, Error)]
pub enum SubmitMessageError {
    #[error("failed to store message: {0}")]
    StoreFailed(#[from] StoreError),
}

/// メッセージ履歴の取得エラー
#[derive(Debug, Error)]
pub enum GetRoomHistoryError {
    #[error("failed to load messages: {0}")]
    StoreFailed(#[from] StoreError),
}

/// ルーム一覧の取得エラー
#[derive(Debug, Error)]
pub enum GetRoomsError {
    #[error("failed to load rooms: {0}")]
    StoreFailed(#[from] StoreError),
}

/// 直近のペアリング記録の取得エラー
#[derive(Debug, Error)]
pub enum GetRecentPairingsError {
    #[error("failed to load pairings: {0}")]
    StoreFailed(#[from] StoreError),
}

/// 待合室の状態取得エラー
#[derive(Debug, Error)]
pub enum GetWaitingStatusError {
    #[error("waiting room is unavailable: {0}")]
    CoordinatorUnavailable(#[from] ActorError),
}
