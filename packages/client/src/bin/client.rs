//! Tandem terminal client.
//!
//! Joins the waiting room, waits for a partner and then chats in the assigned
//! room. Lines read from stdin are sent as messages. Reconnects with
//! exponential backoff (1 s doubling up to 30 s) when the connection drops.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tandem-client -- --user-name Alice
//! cargo run --bin tandem-client -- --url ws://127.0.0.1:3000 --user-name Bob
//! ```

use clap::Parser;
use uuid::Uuid;

use tandem_client::{ClientConfig, run_client};
use tandem_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "tandem-client")]
#[command(about = "Terminal client for anonymous two-party chat", long_about = None)]
struct Args {
    /// Base WebSocket URL of the server
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080")]
    url: String,

    /// User ID reported to the server (random if omitted)
    #[arg(long)]
    user_id: Option<String>,

    /// Display name shown to the partner (random if omitted)
    #[arg(short = 'n', long)]
    user_name: Option<String>,

    /// Consecutive failed connections tolerated before exiting
    #[arg(long, default_value = "5")]
    max_reconnect_attempts: u32,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(&[env!("CARGO_PKG_NAME")], "info");

    let args = Args::parse();
    let random = Uuid::new_v4().simple().to_string();
    let config = ClientConfig {
        base_url: args.url,
        user_id: args.user_id.unwrap_or_else(|| random.clone()),
        user_name: args
            .user_name
            .unwrap_or_else(|| format!("Guest-{}", &random[..6])),
        max_reconnect_attempts: args.max_reconnect_attempts,
    };

    if let Err(e) = run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
