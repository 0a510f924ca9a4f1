//! IMDb resolver (primary HTML scrape)
//!
//! Title → metadata search → first hit's IMDb id → title page → IMDb chain.
//! One page fetch, one parse.

use super::run_chain;
use crate::extractors::{imdb, ChainError, StrategyChain};
use crate::fetch::Fetcher;
use crate::metadata::MetadataProvider;
use crate::types::{RatingQuery, RatingResolver, RatingSource, ResolveError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// IMDb title page base URL
pub const IMDB_TITLE_URL: &str = "https://www.imdb.com/title";

pub struct ImdbResolver {
    metadata: Arc<dyn MetadataProvider>,
    fetcher: Arc<dyn Fetcher>,
    chain: StrategyChain,
    title_base: String,
}

impl ImdbResolver {
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, ChainError> {
        Ok(Self {
            metadata,
            fetcher,
            chain: imdb::chain()?,
            title_base: IMDB_TITLE_URL.to_string(),
        })
    }

    /// Point the resolver at another title page base
    pub fn with_title_base(mut self, title_base: impl Into<String>) -> Self {
        self.title_base = title_base.into();
        self
    }
}

#[async_trait]
impl RatingResolver for ImdbResolver {
    fn source(&self) -> RatingSource {
        RatingSource::Imdb
    }

    async fn resolve(&self, query: &RatingQuery) -> Result<String, ResolveError> {
        let hits = self.metadata.search(query.title()).await?;
        let first = hits
            .first()
            .ok_or_else(|| {
                ResolveError::NotFound(format!("no metadata hit for '{}'", query.title()))
            })?;

        let imdb_id = self.metadata.imdb_id(first.id).await?;
        let url = format!("{}/{}/", self.title_base, imdb_id);
        debug!(url = %url, "Fetching IMDb page");

        let html = self.fetcher.get_text(&url).await?;
        run_chain(&self.chain, &html, RatingSource::Imdb)
    }
}
