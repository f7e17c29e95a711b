//! Tandem matchmaking and chat relay server.
//!
//! Pairs clients from the waiting room in arrival order and relays chat
//! messages between the two members of each room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tandem-server
//! cargo run --bin tandem-server -- --host 0.0.0.0 --port 3000
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use tandem_server::{
    config::{CoordinatorConfig, RoomConfig, ServerConfig},
    infrastructure::store::InMemoryMessageStore,
    ui::{AppState, Server},
};
use tandem_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "tandem-server")]
#[command(about = "Matchmaking and chat relay server for anonymous two-party chat", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Messages kept in memory per room and replayed on connect
    #[arg(long, default_value = "50")]
    history_capacity: usize,

    /// Seconds without activity before a waiting client is dropped
    #[arg(long, default_value = "60")]
    waiting_idle_timeout_secs: u64,

    /// Seconds an empty room is retained before eviction
    #[arg(long, default_value = "30")]
    room_idle_grace_secs: u64,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            coordinator: CoordinatorConfig {
                idle_timeout: Duration::from_secs(args.waiting_idle_timeout_secs),
                ..CoordinatorConfig::default()
            },
            room: RoomConfig {
                history_capacity: args.history_capacity,
                idle_grace: Duration::from_secs(args.room_idle_grace_secs),
            },
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(&[env!("CARGO_PKG_NAME"), "tower_http"], "debug");

    let config = ServerConfig::from(Args::parse());
    tracing::debug!("{:?}", config);

    // 1. Store (in-memory)
    // 2. Actors and UseCases
    // 3. Server
    let store = Arc::new(InMemoryMessageStore::new());
    let state = Arc::new(AppState::new(&config, store, Arc::new(SystemClock)));
    let server = Server::new(state);

    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
