//! crosspost-server - HTTP surface for multi-platform publishing

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use libcrosspost::{Config, ConnectionRegistry, Lifecycle, Publisher, Result, SqliteStore};

mod api;

#[derive(Parser, Debug)]
#[command(name = "crosspost-server")]
#[command(about = "Publish posts to multiple social platforms", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "CROSSPOST_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address override (e.g. 0.0.0.0:8080)
    #[arg(short, long)]
    listen: Option<String>,

    /// Force debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    libcrosspost::logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    let listen = cli.listen.clone().unwrap_or_else(|| config.server.listen.clone());

    let store = Arc::new(SqliteStore::new(&config.database.path).await?);
    let config = Arc::new(config);
    let registry = Arc::new(ConnectionRegistry::new(config.clone()));
    let publisher = Arc::new(Publisher::new(registry.clone(), store.clone()));
    let lifecycle = Arc::new(Lifecycle::new(store));

    let router = api::create_router(api::AppState {
        publisher,
        registry,
        lifecycle,
    });

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    info!(address = %listen, "crosspost-server listening");

    axum::serve(listener, router).await?;

    Ok(())
}
