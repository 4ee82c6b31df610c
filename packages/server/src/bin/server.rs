//! Goishi session server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin goishi-server
//! cargo run --bin goishi-server -- --host 0.0.0.0 --port 3000 --quick-match-ai-after-secs 20
//! GOISHI_AI_API_KEY=... cargo run --bin goishi-server
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use goishi_server::{
    config::{AiSettings, DEFAULT_URGENCY_THRESHOLD, ServerSettings},
    domain::{MessagePusher, ReasoningBackend, RoomRepository, StatsProvider},
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        reasoning::{AnthropicConfig, AnthropicReasoningBackend, DisabledReasoningBackend, anthropic},
        repository::InMemoryRoomRepository,
        stats::{DisabledStatsProvider, HttpStatsProvider},
    },
    ui::{AppState, Server},
};
use goishi_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "goishi-server")]
#[command(about = "Five-in-a-row session server (renju / freestyle)", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// API key for the external move reasoning service; AI seats play locally without it
    #[arg(long, env = "GOISHI_AI_API_KEY", hide_env_values = true)]
    ai_api_key: Option<String>,

    /// Model used by the reasoning service
    #[arg(long, env = "GOISHI_AI_MODEL", default_value = anthropic::DEFAULT_MODEL)]
    ai_model: String,

    /// Reasoning service endpoint
    #[arg(long, env = "GOISHI_AI_ENDPOINT", default_value = anthropic::DEFAULT_ENDPOINT)]
    ai_endpoint: String,

    /// Time budget for one external AI decision, in milliseconds
    #[arg(long, default_value = "8000")]
    ai_budget_ms: u64,

    /// Pause before an AI seat moves, in milliseconds
    #[arg(long, default_value = "600")]
    ai_think_ms: u64,

    /// Threat priority at or below which the AI overrides external suggestions
    #[arg(long, default_value_t = DEFAULT_URGENCY_THRESHOLD)]
    ai_urgency: u8,

    /// Pair a lone quick-match player with an AI after this many seconds
    #[arg(long, env = "GOISHI_QUICK_MATCH_AI_AFTER_SECS")]
    quick_match_ai_after_secs: Option<u64>,

    /// Base URL of the player statistics service
    #[arg(long, env = "GOISHI_STATS_URL")]
    stats_url: Option<String>,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "debug")]
    log_level: String,
}

fn reasoning_backend(args: &Args) -> Arc<dyn ReasoningBackend> {
    let Some(api_key) = args.ai_api_key.clone().filter(|key| !key.is_empty()) else {
        tracing::info!("No AI API key configured; AI seats use local heuristics only");
        return Arc::new(DisabledReasoningBackend);
    };
    let config = AnthropicConfig::new(api_key)
        .with_model(args.ai_model.clone())
        .with_endpoint(args.ai_endpoint.clone());
    match AnthropicReasoningBackend::new(config) {
        Ok(backend) => {
            tracing::info!("AI reasoning via {} ({})", args.ai_endpoint, args.ai_model);
            Arc::new(backend)
        }
        Err(e) => {
            tracing::error!("Reasoning backend unavailable, falling back to local play: {}", e);
            Arc::new(DisabledReasoningBackend)
        }
    }
}

fn stats_provider(args: &Args) -> Arc<dyn StatsProvider> {
    let Some(base_url) = args.stats_url.clone() else {
        return Arc::new(DisabledStatsProvider);
    };
    match HttpStatsProvider::new(base_url) {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            tracing::error!("Statistics service unavailable: {}", e);
            Arc::new(DisabledStatsProvider)
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    setup_logger(&[env!("CARGO_BIN_NAME"), "goishi-server"], &args.log_level);

    // 1. Repository / MessagePusher
    let repository: Arc<dyn RoomRepository> = Arc::new(InMemoryRoomRepository::new());
    let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::new());

    // 2. 外部サービス
    let reasoning = reasoning_backend(&args);
    let stats = stats_provider(&args);

    // 3. Settings
    let settings = ServerSettings {
        ai: AiSettings {
            think_delay: Duration::from_millis(args.ai_think_ms),
            decision_budget: Duration::from_millis(args.ai_budget_ms),
            urgency_threshold: args.ai_urgency,
            quick_match_fallback: args.quick_match_ai_after_secs.map(Duration::from_secs),
        },
    };

    // 4. UseCases (AppState) and server
    let state = AppState::build(
        repository,
        message_pusher,
        reasoning,
        stats,
        Arc::new(SystemClock),
        settings,
    );
    let server = Server::new(Arc::new(state));
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
