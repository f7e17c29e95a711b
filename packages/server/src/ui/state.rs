//! Shared application state.

use std::sync::Arc;

use tandem_shared::time::Clock;

use crate::{
    actor::{ConnectionRegistry, RoomRegistry, WaitingCoordinator},
    config::ServerConfig,
    domain::MessageStore,
    usecase::{
        DisconnectParticipantUseCase, EnterRoomUseCase, GetRecentPairingsUseCase,
        GetRoomHistoryUseCase, GetRoomsUseCase, GetWaitingStatusUseCase, JoinWaitingRoomUseCase,
        SendMessageUseCase, SubmitMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// JoinWaitingRoomUseCase（待合室参加のユースケース）
    pub join_waiting_room_usecase: Arc<JoinWaitingRoomUseCase>,
    /// EnterRoomUseCase（チャットルーム入室のユースケース）
    pub enter_room_usecase: Arc<EnterRoomUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// SubmitMessageUseCase（HTTP 経由のメッセージ保存のユースケース）
    pub submit_message_usecase: Arc<SubmitMessageUseCase>,
    /// GetRoomHistoryUseCase（メッセージ履歴取得のユースケース）
    pub get_room_history_usecase: Arc<GetRoomHistoryUseCase>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetRecentPairingsUseCase（直近のペアリング取得のユースケース）
    pub get_recent_pairings_usecase: Arc<GetRecentPairingsUseCase>,
    /// GetWaitingStatusUseCase（待合室の状態取得のユースケース）
    pub get_waiting_status_usecase: Arc<GetWaitingStatusUseCase>,
    /// RoomRegistry（デバッグ用のルーム一覧）
    pub rooms: Arc<RoomRegistry>,
}

impl AppState {
    /// Start the actors and wire every use case around them.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(config: &ServerConfig, store: Arc<dyn MessageStore>, clock: Arc<dyn Clock>) -> Self {
        // 1. Actors
        let coordinator = WaitingCoordinator::spawn(store.clone(), clock.clone(), config.coordinator);
        let rooms = Arc::new(RoomRegistry::new(store.clone(), clock.clone(), config.room));
        let connections = Arc::new(ConnectionRegistry::new());

        // 2. UseCases
        Self {
            join_waiting_room_usecase: Arc::new(JoinWaitingRoomUseCase::new(
                coordinator.clone(),
                connections.clone(),
                clock.clone(),
            )),
            enter_room_usecase: Arc::new(EnterRoomUseCase::new(
                rooms.clone(),
                connections.clone(),
                clock.clone(),
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(connections.clone())),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
                connections.clone(),
                coordinator.clone(),
                rooms.clone(),
            )),
            submit_message_usecase: Arc::new(SubmitMessageUseCase::new(store.clone(), clock)),
            get_room_history_usecase: Arc::new(GetRoomHistoryUseCase::new(store.clone())),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(store.clone())),
            get_recent_pairings_usecase: Arc::new(GetRecentPairingsUseCase::new(store)),
            get_waiting_status_usecase: Arc::new(GetWaitingStatusUseCase::new(
                coordinator,
                connections,
            )),
            rooms,
        }
    }
}
