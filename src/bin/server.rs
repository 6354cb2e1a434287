//! Agenda Backend Server
//!
//! Run with: cargo run --bin agenda-server
//!
//! Serves `/timeslots`, `/auth`, `/user`, `/health` and the `/ws` chat channel from
//! process memory.
//!
//! # Configuration
//!
//! `[server]` and `[logging]` from the config file, or environment variables:
//! - `AGENDA_SERVER_HOST`: Host to bind to (default: 127.0.0.1)
//! - `AGENDA_SERVER_PORT`: Port to listen on (default: 3000)
//! - `RUST_LOG`: Log filter (default: agenda=info,tower_http=info)

use agenda::api::{serve, ApiConfig, AppState};
use agenda::config::Config;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agenda-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "In-memory backend for the agenda dashboard")]
struct Args {
    /// Config file (default: <config_dir>/agenda/config.toml, then ./config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.logging.init()?;

    tracing::info!("Starting agenda backend v{}", env!("CARGO_PKG_VERSION"));

    let api_config = ApiConfig::from(&config.server);
    tracing::info!(
        history_limit = api_config.history_limit,
        max_connections = api_config.max_connections,
        "Chat hub configured"
    );

    let state = AppState::new(api_config.clone());
    serve(state, &api_config)
        .await
        .with_context(|| format!("Server on {} failed", api_config.addr()))?;

    tracing::info!("Agenda backend stopped");
    Ok(())
}
