//! Rating aggregation
//!
//! # Architecture
//! 1. Cache lookup keyed by movie id
//! 2. Metadata details (the only fatal step)
//! 3. All source resolvers, concurrently, each on its own task under a
//!    timeout
//! 4. Settle every outcome into a rating slot, then cache the record
//!
//! [`settle`] is the single place where resolver errors, panics and timeouts
//! become `"N/A"`. Nothing a resolver does can fail the aggregation.

use crate::cache::{movie_key, RatingCache};
use crate::metadata::{MetadataError, MetadataProvider};
use crate::types::{
    AggregateRating, RatingQuery, RatingResolver, RatingSource, RatingValue, Ratings,
    ResolveError, SearchResponse, SourceResolution,
};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tokio::time::error::Elapsed;
use tracing::{debug, info, warn};

/// Aggregates every source's rating for one movie
pub struct RatingAggregator {
    metadata: Arc<dyn MetadataProvider>,
    resolvers: Vec<Arc<dyn RatingResolver>>,
    cache: Arc<dyn RatingCache>,
    resolver_timeout: Duration,
}

impl RatingAggregator {
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        resolvers: Vec<Arc<dyn RatingResolver>>,
        cache: Arc<dyn RatingCache>,
        resolver_timeout: Duration,
    ) -> Self {
        Self {
            metadata,
            resolvers,
            cache,
            resolver_timeout,
        }
    }

    /// Entries currently held by the result cache
    pub fn cache_entries(&self) -> usize {
        self.cache.len()
    }

    /// Build the aggregate record for a movie
    ///
    /// # Errors
    /// Only a metadata lookup failure. Source failures degrade to `"N/A"`.
    pub async fn aggregate(&self, movie_id: u64) -> Result<AggregateRating, MetadataError> {
        let key = movie_key(movie_id);
        if let Some(cached) = self.cache.get(&key) {
            debug!(movie_id, "Serving cached aggregate");
            return Ok(cached);
        }

        let details = self.metadata.details(movie_id).await?;
        let query = RatingQuery::new(details.title.clone());

        let mut ratings = Ratings::default();
        for resolution in self.resolve_all(&query).await {
            ratings.record(resolution);
        }
        if let Some(score) = details.native_score() {
            ratings.record(SourceResolution {
                source: RatingSource::Tmdb,
                value: RatingValue::Available(score),
            });
        }

        let record = AggregateRating {
            movie_id,
            title: details.title.clone(),
            year: details.year(),
            plot: details.plot(),
            poster: details.poster_url(),
            trailer: details.trailer_url(),
            ratings,
        };

        info!(
            movie_id,
            title = %record.title,
            available = record.ratings.available_count(),
            "Aggregate assembled"
        );

        self.cache.set(key, record.clone());
        Ok(record)
    }

    /// Search passthrough used for disambiguation
    ///
    /// Zero hits is a successful, empty response.
    pub async fn search(&self, query: &str) -> Result<SearchResponse, MetadataError> {
        let movies = self.metadata.search(query).await?;
        Ok(SearchResponse::new(movies))
    }

    /// Run every resolver on its own task; one outcome per resolver
    async fn resolve_all(&self, query: &RatingQuery) -> Vec<SourceResolution> {
        let limit = self.resolver_timeout;

        let tasks = self.resolvers.iter().map(|resolver| {
            let resolver = Arc::clone(resolver);
            let query = query.clone();
            let source = resolver.source();
            let handle = tokio::spawn(async move {
                tokio::time::timeout(limit, resolver.resolve(&query)).await
            });
            async move { (source, handle.await) }
        });

        join_all(tasks)
            .await
            .into_iter()
            .map(|(source, outcome)| settle(source, outcome))
            .collect()
    }
}

/// Collapse one resolver outcome into its slot value
fn settle(
    source: RatingSource,
    outcome: Result<Result<Result<String, ResolveError>, Elapsed>, JoinError>,
) -> SourceResolution {
    let value = match outcome {
        Ok(Ok(Ok(value))) => {
            debug!(source = %source, value = %value, "Source resolved");
            RatingValue::Available(value)
        }
        Ok(Ok(Err(e))) => {
            warn!(source = %source, error = %e, "Source unavailable");
            RatingValue::Unavailable
        }
        Ok(Err(_)) => {
            warn!(source = %source, "Source timed out");
            RatingValue::Unavailable
        }
        Err(e) => {
            warn!(source = %source, error = %e, "Source task aborted");
            RatingValue::Unavailable
        }
    };

    SourceResolution { source, value }
}
