//! Console client for the Goishi session server.
//!
//! Type commands at the prompt (`help` lists them); the board is redrawn
//! after every move. Automatically reconnects on disconnection
//! (max 5 attempts with 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin goishi-client -- --username Alice
//! cargo run --bin goishi-client -- -n Bob -g freestyle -u ws://127.0.0.1:3000/ws
//! ```

use clap::Parser;
use goishi_shared::{logger::setup_logger, protocol::GameType};

#[derive(Parser, Debug)]
#[command(name = "goishi-client")]
#[command(about = "Console client for five-in-a-row sessions", long_about = None)]
struct Args {
    /// Name shown to other players
    #[arg(short = 'n', long)]
    username: String,

    /// Rule set to play (renju or freestyle)
    #[arg(short = 'g', long, default_value = "renju")]
    game: GameType,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Log level for the client crates
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    setup_logger(&[env!("CARGO_BIN_NAME"), "goishi-client"], &args.log_level);

    if let Err(e) = goishi_client::run_client(args.url, args.game, args.username).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
