//! Request handlers.

mod http;
mod websocket;

pub use http::{
    debug_rooms, get_recent_pairs, get_room_messages, get_rooms, get_waiting_status,
    health_check, submit_message,
};
pub use websocket::{room_websocket_handler, waiting_room_websocket_handler};
