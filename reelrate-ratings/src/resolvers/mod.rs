//! Source resolvers
//!
//! One resolver per rating slot, each implementing [`RatingResolver`]:
//! - **imdb** - metadata lookup → IMDb title page → IMDb chain
//! - **rotten_tomatoes** - OMDb structured lookup (optional page fallback)
//! - **letterboxd** - direct slug URL → site search → web search, then the
//!   Letterboxd chain
//!
//! Resolvers report every failure as a [`ResolveError`]; they never decide
//! on the sentinel themselves.

pub mod imdb;
pub mod letterboxd;
pub mod rotten_tomatoes;

pub use imdb::ImdbResolver;
pub use letterboxd::LetterboxdResolver;
pub use rotten_tomatoes::{OmdbClient, RottenTomatoesResolver};

use crate::extractors::StrategyChain;
use crate::metadata::MetadataError;
use crate::types::{RatingSource, ResolveError};
use tracing::debug;

impl From<MetadataError> for ResolveError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::Network(e) => ResolveError::Network(e),
            MetadataError::Parse(msg) => ResolveError::Parse(msg),
            MetadataError::NotFound(msg) => ResolveError::NotFound(msg),
            MetadataError::ConfigurationMissing => {
                ResolveError::ConfigurationMissing("TMDB API key".to_string())
            }
        }
    }
}

/// Run a chain over a fetched page, turning a miss into a parse error
pub(crate) fn run_chain(
    chain: &StrategyChain,
    html: &str,
    source: RatingSource,
) -> Result<String, ResolveError> {
    match chain.extract(html) {
        Some(extraction) => {
            debug!(
                source = %source,
                strategy = extraction.strategy,
                value = %extraction.value,
                "Rating extracted"
            );
            Ok(extraction.value)
        }
        None => Err(ResolveError::Parse(format!(
            "no {} extraction strategy matched",
            source
        ))),
    }
}
