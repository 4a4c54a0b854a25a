//! Hexclaim game server.
//!
//! Hosts one single-player session per WebSocket connection and paces the
//! enemy's replies.

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod protocol;
mod server;
mod session;

use config::ServerConfig;
use server::ServerState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let addr = config.addr;

    info!(
        levels = config.catalog.len(),
        enemy_delay_ms = config.enemy_delay.as_millis() as u64,
        powerups = config.powerups,
        "Starting Hexclaim server..."
    );

    let state = Arc::new(ServerState::new(config));

    server::run_server(addr, state).await
}
