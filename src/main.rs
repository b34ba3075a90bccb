//! Pokedex Cache - A caching aggregation server for the PokeAPI
//!
//! Fronts the slow, rate-limited PokeAPI with an in-process TTL cache,
//! coalesces duplicate concurrent fetches, and batches per-item detail
//! lookups to stay under upstream load limits.

mod api;
mod cache;
mod coalesce;
mod config;
mod error;
mod fetch;
mod models;
mod service;
mod tasks;
mod upstream;

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_router, AppState};
use config::Config;
use tasks::{spawn_cleanup_task, spawn_invalidation_tasks, InvalidationRule};

/// Main entry point for the aggregation server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create cache store, upstream client, and aggregation service
/// 4. Start the expired-entry sweep and scheduled invalidation tasks
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pokedex_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pokedex Cache Server");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: max_entries={}, default_ttl={}s, port={}, upstream={}",
        config.max_entries, config.default_ttl, config.server_port, config.upstream_base_url
    );

    // Create application state: cache store, upstream client, service
    let state = AppState::from_config(&config).context("failed to build application state")?;
    info!("Cache store and upstream client initialized");

    // Start background tasks: expired-entry sweep + scheduled invalidation
    let mut background = vec![spawn_cleanup_task(state.cache.clone(), config.cleanup_interval)];
    background.extend(spawn_invalidation_tasks(
        state.cache.clone(),
        InvalidationRule::defaults_from(&config),
    ));
    info!("Background tasks started");

    // Create router with all endpoints
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(background))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the background tasks and allows graceful
/// shutdown.
async fn shutdown_signal(background: Vec<JoinHandle<()>>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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

    // Abort the background tasks
    for handle in background {
        handle.abort();
    }
    warn!("Background tasks aborted");
}
