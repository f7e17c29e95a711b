//! WebSocket client session management.
//!
//! A client goes through two kinds of sessions: one on the waiting room
//! until it is paired, then one on the assigned chat room.

use futures_util::{SinkExt, StreamExt};
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use tandem_server::infrastructure::dto::websocket::{
    ChatBroadcastMessage, FrameEnvelope, HistoryMessage, JoinMessage, MessageType, PairedMessage,
    SendChatMessage, WaitingMessage,
};

use crate::{error::ClientError, formatter::MessageFormatter, ui::redisplay_prompt};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Self-reported identity of this client
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
}

async fn connect(url: &str) -> Result<WsStream, ClientError> {
    let (ws_stream, _) = connect_async(url)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    Ok(ws_stream)
}

/// Run a waiting-room session until paired.
///
/// # Returns
///
/// * `Ok(Some(room_id))` - Paired into `room_id`
/// * `Ok(None)` - The user quit while waiting
/// * `Err(ClientError)` - The connection failed or closed before pairing
pub async fn run_waiting_session(
    base_url: &str,
    user: &User,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<Option<String>, ClientError> {
    let url = format!("{}/api/waiting-room/websocket", base_url);
    let mut ws = connect(&url).await?;
    tracing::info!("Connected to waiting room");

    let join = JoinMessage::new(user.id.clone(), user.name.clone());
    let json = serde_json::to_string(&join).map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    ws.send(Message::Text(json.into()))
        .await
        .map_err(|_| ClientError::ConnectionLost)?;

    loop {
        tokio::select! {
            message = ws.next() => {
                let text = match message {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("Waiting room closed the connection before pairing");
                        return Err(ClientError::ConnectionLost);
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket read error: {}", e);
                        return Err(ClientError::ConnectionLost);
                    }
                };

                match FrameEnvelope::peek(text.as_str()) {
                    Ok(MessageType::Waiting) => {
                        if let Ok(waiting) = serde_json::from_str::<WaitingMessage>(text.as_str()) {
                            print!(
                                "{}",
                                MessageFormatter::format_waiting(waiting.position, waiting.message.as_deref())
                            );
                            redisplay_prompt(&user.name);
                        }
                    }
                    Ok(MessageType::Paired) => {
                        if let Ok(paired) = serde_json::from_str::<PairedMessage>(text.as_str()) {
                            print!(
                                "{}",
                                MessageFormatter::format_paired(&paired.partner_name, &paired.room_id)
                            );
                            return Ok(Some(paired.room_id));
                        }
                    }
                    _ => {
                        print!("{}", MessageFormatter::format_raw_message(text.as_str()));
                        redisplay_prompt(&user.name);
                    }
                }
            }
            line = input_rx.recv() => match line {
                Some(_) => {
                    println!("Not paired yet; messages can be sent once a partner is found.");
                    redisplay_prompt(&user.name);
                }
                None => {
                    let _ = ws.close(None).await;
                    return Ok(None);
                }
            },
        }
    }
}

/// Run a chat-room session until the user quits or the connection drops.
///
/// # Returns
///
/// * `Ok(())` - The user quit
/// * `Err(ClientError)` - The connection failed or was lost
pub async fn run_room_session(
    base_url: &str,
    room_id: &str,
    user: &User,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let url = format!("{}/api/chat/room/{}/websocket", base_url, room_id);
    let ws = connect(&url).await?;
    tracing::info!("Connected to room {}", room_id);
    println!(
        "\nYou are '{}'. Type messages and press Enter to send. Press Ctrl+C to exit.\n",
        user.name
    );

    let (mut write, mut read) = ws.split();

    // Spawn a task to handle incoming messages
    let user_for_read = user.clone();
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    let formatted = match FrameEnvelope::peek(text.as_str()) {
                        Ok(MessageType::History) => {
                            serde_json::from_str::<HistoryMessage>(text.as_str())
                                .ok()
                                .map(|history| {
                                    MessageFormatter::format_history(
                                        &history.messages,
                                        &user_for_read.id,
                                    )
                                })
                        }
                        Ok(MessageType::Message) => {
                            serde_json::from_str::<ChatBroadcastMessage>(text.as_str())
                                .ok()
                                .map(|broadcast| {
                                    MessageFormatter::format_chat_message(
                                        &broadcast.message,
                                        &user_for_read.id,
                                    )
                                })
                        }
                        _ => None,
                    };
                    let formatted = formatted
                        .unwrap_or_else(|| MessageFormatter::format_raw_message(text.as_str()));
                    print!("{}", formatted);
                    redisplay_prompt(&user_for_read.name);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    // Send each input line with the identity attached
    loop {
        tokio::select! {
            _ = &mut read_task => return Err(ClientError::ConnectionLost),
            line = input_rx.recv() => {
                let Some(line) = line else {
                    read_task.abort();
                    let _ = write.close().await;
                    return Ok(());
                };

                let frame = SendChatMessage::new(
                    Some(user.id.clone()),
                    Some(user.name.clone()),
                    line,
                );
                let json = match serde_json::to_string(&frame) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!("Failed to serialize message: {}", e);
                        continue;
                    }
                };
                if let Err(e) = write.send(Message::Text(json.into())).await {
                    tracing::warn!("Failed to send message: {}", e);
                    read_task.abort();
                    return Err(ClientError::ConnectionLost);
                }
            }
        }
    }
}
