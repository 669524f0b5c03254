//! Todow Server Binary
//!
//! Serves the to-do API and web page.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use todow_server::config::{ConfigOverrides, ServerConfig};
use todow_server::{serve, AppState};

#[derive(Debug, Parser)]
#[command(name = "todow-server", version, about = "Web to-do list server")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address [default: 0.0.0.0:9999]
    #[arg(short, long)]
    addr: Option<String>,

    /// HTTP Basic username [default: todow]
    #[arg(short, long)]
    user: Option<String>,

    /// HTTP Basic password [default: todow]
    #[arg(short, long)]
    password: Option<String>,

    /// Database file [default: todos.db]
    #[arg(short, long)]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    }
    .with_overrides(ConfigOverrides {
        listen_addr: args.addr,
        db_path: args.db,
        username: args.user,
        password: args.password,
    });

    // A store that cannot be opened is fatal.
    let state = AppState::open(&config).map_err(|e| {
        tracing::error!("unable to open item store {:?}: {}", config.db_path, e);
        e
    })?;

    serve(&config.listen_addr, Arc::new(state)).await
}
