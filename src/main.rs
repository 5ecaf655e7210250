//! Feed Cache - two-tier content cache for a social feed
//!
//! Serves the feed through the cache over HTTP.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feed_cache::api::create_router;
use feed_cache::tasks::MemoryPressure;
use feed_cache::{spawn_memory_pressure_task, AppState, Config};

/// Main entry point for the feed cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the single cache instance and the feed service
/// 4. Start the memory pressure listener (fed by SIGUSR1 on unix)
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feed_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting feed cache server");

    let config = Config::from_env();
    let settings = config.cache_settings();
    info!(
        memory_budget_bytes = settings.memory_budget_bytes,
        disk_budget_bytes = settings.disk_budget_bytes,
        ttl_seconds = settings.ttl_seconds,
        cache_dir = %settings.directory.display(),
        posts_file = %config.posts_file.display(),
        port = config.server_port,
        "Configuration loaded"
    );

    let state = AppState::from_config(&config);
    info!("Cache initialized");

    let (pressure_tx, pressure_rx) = mpsc::channel(8);
    let pressure_handle = spawn_memory_pressure_task(state.cache.clone(), pressure_rx);
    let forward_handle = spawn_pressure_signal_forwarder(pressure_tx)?;

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(handle) = forward_handle {
        handle.abort();
    }
    pressure_handle.abort();
    warn!("Background tasks aborted");

    info!("Server shutdown complete");
    Ok(())
}

/// Forwards SIGUSR1 as a memory pressure signal.
#[cfg(unix)]
fn spawn_pressure_signal_forwarder(
    tx: mpsc::Sender<MemoryPressure>,
) -> anyhow::Result<Option<tokio::task::JoinHandle<()>>> {
    let mut usr1 = signal::unix::signal(signal::unix::SignalKind::user_defined1())
        .context("failed to install SIGUSR1 handler")?;

    Ok(Some(tokio::spawn(async move {
        while usr1.recv().await.is_some() {
            info!("Received SIGUSR1, reporting memory pressure");
            if tx.send(MemoryPressure).await.is_err() {
                break;
            }
        }
    })))
}

#[cfg(not(unix))]
fn spawn_pressure_signal_forwarder(
    _tx: mpsc::Sender<MemoryPressure>,
) -> anyhow::Result<Option<tokio::task::JoinHandle<()>>> {
    Ok(None)
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
