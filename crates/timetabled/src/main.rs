use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use timetabled::config::ServerConfig;
use timetabled::server;
use timetabled::types::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = match std::env::args().nth(1) {
        Some(path) => ServerConfig::load_from_file(Path::new(&path))?,
        None => ServerConfig::default(),
    };

    let bind_addr = format!("{}:{}", config.address, config.port);
    info!("Starting timetabled on {} (db: {})", bind_addr, config.db_path);

    let state = Arc::new(AppState::new(config));
    let router = server::create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install ctrl-c handler: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
