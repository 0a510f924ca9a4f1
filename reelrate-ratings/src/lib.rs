//! reelrate-ratings library interface
//!
//! Multi-source movie rating resolution: one metadata lookup, three rating
//! resolvers running concurrently, a TTL result cache, and a thin axum shell.

pub mod aggregator;
pub mod api;
pub mod cache;
pub mod error;
pub mod extractors;
pub mod fetch;
pub mod metadata;
pub mod resolvers;
pub mod slug;
pub mod types;

pub use crate::aggregator::RatingAggregator;
pub use crate::error::{ApiError, ApiResult};

use axum::{middleware, Router};
use chrono::{DateTime, Utc};
use reelrate_common::config::TomlConfig;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::cache::TtlCache;
use crate::extractors::ChainError;
use crate::fetch::{FetchError, Fetcher, HttpFetcher};
use crate::metadata::{MetadataProvider, TmdbClient};
use crate::resolvers::{ImdbResolver, LetterboxdResolver, OmdbClient, RottenTomatoesResolver};
use crate::types::RatingResolver;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<RatingAggregator>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(aggregator: Arc<RatingAggregator>) -> Self {
        Self {
            aggregator,
            startup_time: Utc::now(),
        }
    }
}

/// Startup wiring failure
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("HTTP client: {0}")]
    Fetch(#[from] FetchError),

    #[error("extraction strategy table: {0}")]
    Chain(#[from] ChainError),
}

/// API credentials after env/TOML resolution
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub tmdb_api_key: Option<String>,
    pub omdb_api_key: Option<String>,
}

/// Wire the production aggregator over a shared HTTP fetcher
pub fn build_aggregator(
    config: &TomlConfig,
    credentials: Credentials,
) -> Result<RatingAggregator, StartupError> {
    let fetcher: Arc<dyn Fetcher> =
        Arc::new(HttpFetcher::new(Duration::from_secs(config.http_timeout_secs))?);
    build_aggregator_with(config, credentials, fetcher)
}

/// Wire the aggregator over any fetcher
pub fn build_aggregator_with(
    config: &TomlConfig,
    credentials: Credentials,
    fetcher: Arc<dyn Fetcher>,
) -> Result<RatingAggregator, StartupError> {
    let metadata: Arc<dyn MetadataProvider> =
        Arc::new(TmdbClient::new(fetcher.clone(), credentials.tmdb_api_key));

    let omdb = OmdbClient::new(fetcher.clone(), credentials.omdb_api_key);
    let mut rotten_tomatoes = RottenTomatoesResolver::new(omdb, fetcher.clone());
    if config.rotten_tomatoes_page_fallback {
        rotten_tomatoes = rotten_tomatoes.with_page_fallback()?;
    }

    let resolvers: Vec<Arc<dyn RatingResolver>> = vec![
        Arc::new(ImdbResolver::new(metadata.clone(), fetcher.clone())?),
        Arc::new(rotten_tomatoes),
        Arc::new(LetterboxdResolver::new(fetcher, config.letterboxd_web_search)?),
    ];

    Ok(RatingAggregator::new(
        metadata,
        resolvers,
        Arc::new(TtlCache::new(Duration::from_secs(config.cache_ttl_secs))),
        Duration::from_secs(config.resolver_timeout_secs),
    ))
}

/// Build application router
///
/// API routes first, static files as fallback. CORS allows any origin.
pub fn build_router(
    state: AppState,
    limiter: Arc<api::ClientRateLimiter>,
    static_dir: &Path,
) -> Router {
    let limited = api::movie_routes()
        .route_layer(middleware::from_fn_with_state(limiter, api::limit_by_client_ip));

    Router::new()
        .merge(limited)
        .merge(api::health_routes())
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
