use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use meeple_board_engine::engine::config::{default_config_path, load_config, EngineConfig};
use meeple_board_engine::server::{bind, serve, SessionRegistry};

#[derive(Parser)]
#[command(name = "meeple-board-engine", about = "Tile-laying board game engine server")]
struct Cli {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "MEEPLE_ENGINE_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides the config file)
    #[arg(long)]
    host: Option<String>,

    /// Path to meeple.toml (default: auto-discover)
    #[arg(long, env = "MEEPLE_ENGINE_CONFIG")]
    config: Option<PathBuf>,

    /// Seed for draw piles, for reproducible games
    #[arg(long, env = "MEEPLE_ENGINE_SEED")]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(default_config_path);
    let mut config = match &config_path {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::info!(path = ?config_path, "configuration loaded");

    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(host) = cli.host {
        config.host = host;
    }
    if cli.seed.is_some() {
        config.random_seed = cli.seed;
    }

    let registry = Arc::new(SessionRegistry::from_config(&config));
    let (listener, addr) = bind(&config).await?;
    tracing::info!(
        %addr,
        max_sessions = config.max_sessions,
        seed = ?config.random_seed,
        "starting engine server"
    );

    serve(listener, registry).await?;
    Ok(())
}
