mod aggregate;
mod backend;
mod config;
mod error;
mod model;
mod poller;
mod refresh;
mod routes;
mod server;
mod state;

use clap::Parser;
use std::sync::Arc;
use tracing::info;

use config::{CliArgs, DashboardConfig};
use state::DashboardState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "autodash=info,tower_http=info".into()),
        )
        .init();

    let args = CliArgs::parse();
    info!("Starting autodash v{}", env!("CARGO_PKG_VERSION"));
    info!("Backend: {}", args.backend_url);
    info!(
        "Poll intervals: results {}s, worker {}s",
        args.poll_interval_secs, args.worker_poll_interval_secs
    );

    let config = DashboardConfig::from_args(args);
    let port = config.port;
    let state = Arc::new(DashboardState::new(config));

    // Background refreshers. Handles are held so shutdown stops them
    // explicitly and any in-flight cycle is discarded, not applied.
    let overview_poller = refresh::spawn_overview_refresher(state.clone());
    let worker_poller = refresh::spawn_worker_refresher(state.clone());

    // Build and start HTTP server
    let router = server::build_router(state.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Dashboard listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await?;

    info!("Dashboard shutting down");
    overview_poller.join().await;
    worker_poller.join().await;

    Ok(())
}

async fn shutdown_signal(state: state::SharedState) {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal");
    let _ = state.shutdown_tx.send(());
}
