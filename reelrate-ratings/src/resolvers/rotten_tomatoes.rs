//! Rotten Tomatoes resolver (structured API)
//!
//! Reads the Tomatometer from the OMDb ratings list. When the page fallback
//! is enabled and OMDb has no score, the Rotten Tomatoes movie page at the
//! underscore slug is scraped instead.
//!
//! # API Reference
//! - Endpoint: `http://www.omdbapi.com/?t={title}&apikey={key}`
//! - Response: `{"Response": "True", "Ratings": [{"Source": ..., "Value": ...}]}`

use super::run_chain;
use crate::extractors::{rotten_tomatoes, ChainError, StrategyChain};
use crate::fetch::Fetcher;
use crate::slug::{slugify, SlugStyle};
use crate::types::{RatingQuery, RatingResolver, RatingSource, ResolveError};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// OMDb API base URL
pub const OMDB_API_URL: &str = "http://www.omdbapi.com/";

/// Rotten Tomatoes movie page base URL
pub const ROTTEN_TOMATOES_MOVIE_URL: &str = "https://www.rottentomatoes.com/m";

/// Source label OMDb uses for the Tomatometer
const OMDB_SOURCE_LABEL: &str = "Rotten Tomatoes";

/// One entry of the OMDb ratings list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OmdbRating {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// OMDb title lookup result
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OmdbRatings {
    pub found: bool,
    pub ratings: Vec<OmdbRating>,
}

impl OmdbRatings {
    /// Value published for `label`, if any
    pub fn value_for(&self, label: &str) -> Option<&str> {
        self.ratings
            .iter()
            .find(|r| r.source == label)
            .map(|r| r.value.as_str())
            .filter(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Ratings", default)]
    ratings: Vec<OmdbRating>,
}

/// OMDb structured ratings lookup
pub struct OmdbClient {
    fetcher: Arc<dyn Fetcher>,
    api_key: Option<String>,
    base_url: String,
}

impl OmdbClient {
    pub fn new(fetcher: Arc<dyn Fetcher>, api_key: Option<String>) -> Self {
        Self {
            fetcher,
            api_key,
            base_url: OMDB_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Look up a title's aggregate ratings
    ///
    /// # Errors
    /// `ConfigurationMissing` without a key, `Network` on fetch failure,
    /// `Parse` on malformed JSON.
    pub async fn by_title(&self, title: &str) -> Result<OmdbRatings, ResolveError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ResolveError::ConfigurationMissing("OMDb API key".to_string()))?;

        let url = format!(
            "{}?t={}&apikey={}",
            self.base_url,
            urlencoding::encode(title),
            key
        );
        let body = self.fetcher.get_text(&url).await?;
        let response: OmdbResponse =
            serde_json::from_str(&body).map_err(|e| ResolveError::Parse(e.to_string()))?;

        Ok(OmdbRatings {
            found: response.response == "True",
            ratings: response.ratings,
        })
    }
}

pub struct RottenTomatoesResolver {
    omdb: OmdbClient,
    fetcher: Arc<dyn Fetcher>,
    page_chain: Option<StrategyChain>,
    movie_base: String,
}

impl RottenTomatoesResolver {
    /// Structured lookup only
    pub fn new(omdb: OmdbClient, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            omdb,
            fetcher,
            page_chain: None,
            movie_base: ROTTEN_TOMATOES_MOVIE_URL.to_string(),
        }
    }

    /// Also scrape the movie page when OMDb has no score
    pub fn with_page_fallback(mut self) -> Result<Self, ChainError> {
        self.page_chain = Some(rotten_tomatoes::chain()?);
        Ok(self)
    }

    pub fn with_movie_base(mut self, movie_base: impl Into<String>) -> Self {
        self.movie_base = movie_base.into();
        self
    }

    async fn from_omdb(&self, query: &RatingQuery) -> Result<String, ResolveError> {
        let lookup = self.omdb.by_title(query.title()).await?;
        if !lookup.found {
            return Err(ResolveError::NotFound(format!(
                "OMDb has no entry for '{}'",
                query.title()
            )));
        }

        lookup
            .value_for(OMDB_SOURCE_LABEL)
            .map(str::to_string)
            .ok_or_else(|| ResolveError::NotFound("OMDb entry has no Tomatometer".to_string()))
    }

    async fn from_page(
        &self,
        chain: &StrategyChain,
        query: &RatingQuery,
    ) -> Result<String, ResolveError> {
        let slug = slugify(query.title(), SlugStyle::Underscore);
        if slug.is_empty() {
            return Err(ResolveError::NotFound("title has no usable slug".to_string()));
        }

        let url = format!("{}/{}", self.movie_base, slug);
        debug!(url = %url, "Trying direct Rotten Tomatoes URL");
        let html = self.fetcher.get_text(&url).await?;
        run_chain(chain, &html, RatingSource::RottenTomatoes)
    }
}

#[async_trait]
impl RatingResolver for RottenTomatoesResolver {
    fn source(&self) -> RatingSource {
        RatingSource::RottenTomatoes
    }

    async fn resolve(&self, query: &RatingQuery) -> Result<String, ResolveError> {
        match (self.from_omdb(query).await, &self.page_chain) {
            (Ok(value), _) => {
                debug!(value = %value, "Rotten Tomatoes rating from OMDb");
                Ok(value)
            }
            (Err(e), Some(chain)) => {
                debug!(error = %e, "OMDb lookup failed, trying Rotten Tomatoes page");
                self.from_page(chain, query).await
            }
            (Err(e), None) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::mock::MockFetcher;

    const OMDB_HIT: &str = r#"{"Title":"The Matrix","Response":"True","Ratings":[
        {"Source":"Internet Movie Database","Value":"8.7/10"},
        {"Source":"Rotten Tomatoes","Value":"83%"},
        {"Source":"Metacritic","Value":"73/100"}]}"#;

    fn resolver(
        fetcher: MockFetcher,
        key: Option<&str>,
    ) -> (RottenTomatoesResolver, Arc<MockFetcher>) {
        let fetcher = Arc::new(fetcher);
        let omdb = OmdbClient::new(fetcher.clone(), key.map(String::from));
        (RottenTomatoesResolver::new(omdb, fetcher.clone()), fetcher)
    }

    #[tokio::test]
    async fn test_reads_tomatometer_from_ratings_list() {
        let (resolver, fetcher) =
            resolver(MockFetcher::new().respond("omdbapi.com", OMDB_HIT), Some("k"));

        let rating = resolver.resolve(&RatingQuery::new("The Matrix")).await.unwrap();
        assert_eq!(rating, "83%");
        assert!(fetcher.calls()[0].contains("t=The%20Matrix"));
    }

    #[tokio::test]
    async fn test_missing_source_entry_is_not_found() {
        let body = r#"{"Response":"True","Ratings":[{"Source":"Metacritic","Value":"73/100"}]}"#;
        let (resolver, fetcher) =
            resolver(MockFetcher::new().respond("omdbapi.com", body), Some("k"));

        let err = resolver.resolve(&RatingQuery::new("The Matrix")).await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(_)));
        assert_eq!(fetcher.calls().len(), 1, "no fallback without page fallback enabled");
    }

    #[tokio::test]
    async fn test_omdb_false_response_is_not_found() {
        let body = r#"{"Response":"False","Error":"Movie not found!"}"#;
        let (resolver, _) = resolver(MockFetcher::new().respond("omdbapi.com", body), Some("k"));

        let err = resolver.resolve(&RatingQuery::new("Nope")).await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let (resolver, fetcher) = resolver(MockFetcher::new(), None);

        let err = resolver.resolve(&RatingQuery::new("The Matrix")).await.unwrap_err();
        assert!(matches!(err, ResolveError::ConfigurationMissing(_)));
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_page_fallback_uses_underscore_slug() {
        let fetcher = Arc::new(
            MockFetcher::new()
                .fail("omdbapi.com", 401)
                .respond(
                    "rottentomatoes.com/m/the_matrix",
                    r#"<rt-text slot="criticsScore">83%</rt-text>"#,
                ),
        );
        let omdb = OmdbClient::new(fetcher.clone(), Some("k".into()));
        let resolver = RottenTomatoesResolver::new(omdb, fetcher.clone())
            .with_page_fallback()
            .unwrap();

        let rating = resolver.resolve(&RatingQuery::new("The Matrix (1999)")).await.unwrap();
        assert_eq!(rating, "83%");
        assert_eq!(fetcher.calls().len(), 2);
    }
}
