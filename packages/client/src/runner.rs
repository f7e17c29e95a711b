//! Client execution logic with reconnection support.

use super::{
    domain::{Backoff, Phase},
    formatter::MessageFormatter,
    session::{User, run_room_session, run_waiting_session},
    ui::spawn_input_thread,
};

/// Settings of a client run
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base WebSocket URL of the server, e.g. `ws://127.0.0.1:8080`
    pub base_url: String,
    pub user_id: String,
    pub user_name: String,
    /// Consecutive failed sessions tolerated before giving up
    pub max_reconnect_attempts: u32,
}

/// Run the client: wait for a partner, then chat, reconnecting as needed.
///
/// Once paired, reconnects go back to the same room.
pub async fn run_client(config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let base_url = config.base_url.trim_end_matches('/').to_string();
    let user = User {
        id: config.user_id,
        name: config.user_name,
    };
    let mut input_rx = spawn_input_thread(user.name.clone());
    let mut backoff = Backoff::new(config.max_reconnect_attempts);
    let mut phase = Phase::Waiting;

    loop {
        let result = match &phase {
            Phase::Waiting => {
                tracing::info!("Joining the waiting room at {} as '{}'", base_url, user.name);
                run_waiting_session(&base_url, &user, &mut input_rx).await
            }
            Phase::InRoom(room_id) => {
                tracing::info!("Entering room {} as '{}'", room_id, user.name);
                run_room_session(&base_url, room_id, &user, &mut input_rx)
                    .await
                    .map(|_| None)
            }
        };

        match result {
            Ok(Some(room_id)) => {
                backoff.reset();
                phase = Phase::InRoom(room_id);
            }
            Ok(None) => {
                tracing::info!("Client session ended normally");
                break;
            }
            Err(e) => {
                tracing::warn!("{}", e);
                let Some(delay) = backoff.next_delay(&e) else {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        backoff.failures()
                    );
                    return Err(Box::new(e));
                };

                print!(
                    "{}",
                    MessageFormatter::format_reconnecting(
                        delay,
                        backoff.failures(),
                        config.max_reconnect_attempts
                    )
                );
                tokio::time::sleep(delay).await;
            }
        }
    }

    Ok(())
}
