//! reelrate-ratings - movie rating aggregation service
//!
//! Serves unified IMDb / Rotten Tomatoes / Letterboxd / TMDB ratings for a
//! movie over HTTP, plus a title search for disambiguation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use reelrate_common::config::{
    load_toml_config, resolve_credential, OMDB_API_KEY_ENV, TMDB_API_KEY_ENV,
};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelrate_ratings::api::{client_rate_limiter, spawn_client_sweep};
use reelrate_ratings::{build_aggregator, build_router, AppState, Credentials};

/// Command-line arguments for reelrate-ratings
#[derive(Parser, Debug)]
#[command(name = "reelrate-ratings")]
#[command(about = "Multi-source movie rating aggregation service")]
#[command(version)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Directory served as static files (overrides the config file)
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_toml_config(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(static_dir) = args.static_dir {
        config.static_dir = static_dir;
    }

    // Initialize tracing
    let default_filter = config.logging.level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting reelrate-ratings v{}", env!("CARGO_PKG_VERSION"));

    let credentials = Credentials {
        tmdb_api_key: resolve_credential(
            TMDB_API_KEY_ENV,
            config.tmdb_api_key.as_deref(),
            "TMDB",
        ),
        omdb_api_key: resolve_credential(
            OMDB_API_KEY_ENV,
            config.omdb_api_key.as_deref(),
            "OMDb",
        ),
    };
    if credentials.tmdb_api_key.is_none() {
        warn!("Without a TMDB key every movie and search request will fail");
    }

    let aggregator = build_aggregator(&config, credentials)
        .context("Failed to initialize rating aggregator")?;
    info!(
        cache_ttl_secs = config.cache_ttl_secs,
        letterboxd_web_search = config.letterboxd_web_search,
        rotten_tomatoes_page_fallback = config.rotten_tomatoes_page_fallback,
        "Rating aggregator initialized"
    );

    let state = AppState::new(Arc::new(aggregator));
    let limiter = client_rate_limiter(&config.rate_limit);
    let sweep_every = Duration::from_secs(config.rate_limit.window_secs.max(60));
    let _sweep = spawn_client_sweep(limiter.clone(), sweep_every);
    let app = build_router(state, limiter, &config.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}", addr);
    info!("Static files: {}", config.static_dir.display());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
