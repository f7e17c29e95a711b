//! Message formatting utilities for client display.

use std::time::Duration;

use tandem_server::infrastructure::dto::websocket::ChatMessageDto;
use tandem_shared::time::timestamp_to_rfc3339;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the current queue position in the waiting room
    pub fn format_waiting(position: usize, message: Option<&str>) -> String {
        match message {
            Some(message) => format!("\n[waiting #{}] {}\n", position, message),
            None => format!("\n[waiting #{}]\n", position),
        }
    }

    /// Format the pairing announcement
    pub fn format_paired(partner_name: &str, room_id: &str) -> String {
        format!(
            "\n\n============================================================\n\
             Paired with {}!\n\
             room: {}\n\
             ============================================================\n",
            partner_name, room_id
        )
    }

    /// Format the history replayed when entering a room
    ///
    /// # Arguments
    ///
    /// * `messages` - Recent messages of the room, oldest first
    /// * `my_user_id` - The current user's ID (to mark as "me")
    pub fn format_history(messages: &[ChatMessageDto], my_user_id: &str) -> String {
        let mut output = String::new();
        output.push_str("\n------------------------- history -------------------------\n");

        if messages.is_empty() {
            output.push_str("(No messages yet)\n");
        } else {
            for message in messages {
                output.push_str(&Self::format_line(message, my_user_id));
            }
        }

        output.push_str("------------------------------------------------------------\n");
        output
    }

    /// Format a chat message received from the room
    pub fn format_chat_message(message: &ChatMessageDto, my_user_id: &str) -> String {
        format!("\n{}", Self::format_line(message, my_user_id))
    }

    fn format_line(message: &ChatMessageDto, my_user_id: &str) -> String {
        let me_suffix = if message.sender_id == my_user_id {
            " (me)"
        } else {
            ""
        };
        format!(
            "[{}] @{}{}: {}\n",
            timestamp_to_rfc3339(message.created_at),
            message.sender_name,
            me_suffix,
            message.content
        )
    }

    /// Format the notice shown before a reconnect attempt
    pub fn format_reconnecting(delay: Duration, attempt: u32, max_attempts: u32) -> String {
        format!(
            "\n! connection lost, reconnecting in {}s (attempt {}/{})\n",
            delay.as_secs(),
            attempt,
            max_attempts
        )
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }
}
