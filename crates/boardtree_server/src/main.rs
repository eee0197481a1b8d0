//! Board tree server entry point.
//!
//! # Responsibility
//! - Resolve configuration, initialize logging, open the database, and run
//!   the HTTP listener until ctrl-c.

use std::error::Error;
use std::sync::Arc;

use log::{error, info};

use boardtree_core::db::open_db;
use boardtree_core::{core_version, init_logging};
use boardtree_server::{create_router, spawn_heartbeat, AppState, ServerConfig};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("boardtree_server failed: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let config = ServerConfig::from_env();
    init_logging(&config.log_level, &config.log_dir)?;
    info!(
        "event=server_start module=server status=start version={} db={}",
        core_version(),
        config.db_path
    );

    let conn = open_db(&config.db_path)?;
    let state = Arc::new(AppState::new(conn));
    let heartbeat = spawn_heartbeat(state.bus.clone());

    let router = create_router(state);
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;
    info!(
        "event=server_start module=server status=ok addr={}",
        listener.local_addr()?
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    heartbeat.abort();
    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("event=shutdown_signal module=server status=ok"),
        Err(err) => error!("event=shutdown_signal module=server status=error error={err}"),
    }
}
