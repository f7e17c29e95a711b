//! UseCase 層
//!
//! UI 層（WebSocket / HTTP ハンドラ）から呼び出されるアプリケーションロジック。
//! ライブな状態はアクターが所有し、UseCase はアクターとストアへの操作を束ねます。

mod disconnect_participant;
mod enter_room;
mod error;
mod get_recent_pairings;
mod get_room_history;
mod get_rooms;
mod get_waiting_status;
mod join_waiting_room;
mod send_message;
mod submit_message;

pub use disconnect_participant::DisconnectParticipantUseCase;
pub use enter_room::EnterRoomUseCase;
pub use error::{
    EnterRoomError, GetRecentPairingsError, GetRoomHistoryError, GetRoomsError,
    GetWaitingStatusError, JoinWaitingRoomError, SendMessageError, SubmitMessageError,
};
pub use get_recent_pairings::{
    DEFAULT_RECENT_PAIRINGS_LIMIT, GetRecentPairingsUseCase, MAX_RECENT_PAIRINGS_LIMIT,
};
pub use get_room_history::GetRoomHistoryUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use get_waiting_status::{GetWaitingStatusUseCase, WaitingStatus};
pub use join_waiting_room::JoinWaitingRoomUseCase;
pub use send_message::SendMessageUseCase;
pub use submit_message::SubmitMessageUseCase;
