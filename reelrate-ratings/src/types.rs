//! Core types and the resolver trait
//!
//! - **RatingQuery:** title string handed to every resolver
//! - **RatingValue:** scraped value or the `"N/A"` sentinel
//! - **SourceResolution:** one resolver's outcome, tagged with its source
//! - **AggregateRating:** the per-movie record returned to callers and cached
//!
//! Every resolver implements [`RatingResolver`] and reports failures through
//! [`ResolveError`]. Errors never cross the aggregator boundary: the
//! aggregator turns them into [`RatingValue::Unavailable`].

use crate::fetch::FetchError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Wire representation of an unavailable rating
pub const UNAVAILABLE: &str = "N/A";

// ============================================================================
// Sources and values
// ============================================================================

/// Rating source identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RatingSource {
    /// Primary score, scraped from the IMDb title page
    Imdb,
    /// Secondary score, read from the OMDb ratings list
    RottenTomatoes,
    /// Tertiary score, scraped from Letterboxd
    Letterboxd,
    /// Native score carried by the metadata provider
    Tmdb,
}

impl RatingSource {
    /// Human-readable source name, also used in web searches
    pub fn name(&self) -> &'static str {
        match self {
            RatingSource::Imdb => "IMDb",
            RatingSource::RottenTomatoes => "Rotten Tomatoes",
            RatingSource::Letterboxd => "Letterboxd",
            RatingSource::Tmdb => "TMDB",
        }
    }
}

impl fmt::Display for RatingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Title used as scrape input, built once per aggregation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingQuery {
    title: String,
}

impl RatingQuery {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

/// Loosely typed rating value
///
/// Values keep the exact text the source published ("8.7", "93%", "4.1").
/// Absence is always explicit and serializes as `"N/A"`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RatingValue {
    Available(String),
    #[default]
    Unavailable,
}

impl RatingValue {
    pub fn available(value: impl Into<String>) -> Self {
        RatingValue::Available(value.into())
    }

    pub fn is_available(&self) -> bool {
        matches!(self, RatingValue::Available(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            RatingValue::Available(value) => value,
            RatingValue::Unavailable => UNAVAILABLE,
        }
    }
}

impl fmt::Display for RatingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RatingValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RatingValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == UNAVAILABLE {
            Ok(RatingValue::Unavailable)
        } else {
            Ok(RatingValue::Available(raw))
        }
    }
}

/// Outcome of one resolver run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceResolution {
    pub source: RatingSource,
    pub value: RatingValue,
}

// ============================================================================
// Aggregate record
// ============================================================================

/// Per-source rating slots; every slot is always present
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ratings {
    pub imdb: RatingValue,
    pub rotten_tomatoes: RatingValue,
    pub letterboxd: RatingValue,
    pub tmdb: RatingValue,
}

impl Ratings {
    /// Place a resolution into its slot
    pub fn record(&mut self, resolution: SourceResolution) {
        let slot = match resolution.source {
            RatingSource::Imdb => &mut self.imdb,
            RatingSource::RottenTomatoes => &mut self.rotten_tomatoes,
            RatingSource::Letterboxd => &mut self.letterboxd,
            RatingSource::Tmdb => &mut self.tmdb,
        };
        *slot = resolution.value;
    }

    /// Number of slots holding a real value
    pub fn available_count(&self) -> usize {
        [&self.imdb, &self.rotten_tomatoes, &self.letterboxd, &self.tmdb]
            .iter()
            .filter(|v| v.is_available())
            .count()
    }
}

/// Unified per-movie record, the unit stored in the result cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRating {
    pub movie_id: u64,
    pub title: String,
    /// Release year, or "Unknown"
    pub year: String,
    pub plot: String,
    /// Full poster image URL
    pub poster: Option<String>,
    /// Embeddable trailer URL
    pub trailer: Option<String>,
    pub ratings: Ratings,
}

/// One search hit returned by the search passthrough
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: u64,
    pub title: String,
    pub year: String,
    pub poster: Option<String>,
}

/// Search passthrough response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub multiple_results: bool,
    pub movies: Vec<MovieSummary>,
}

impl SearchResponse {
    pub fn new(movies: Vec<MovieSummary>) -> Self {
        Self {
            multiple_results: movies.len() > 1,
            movies,
        }
    }
}

// ============================================================================
// Resolver trait
// ============================================================================

/// Resolver failure taxonomy
///
/// All variants are recovered at the aggregator and become `"N/A"`.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Timeout, connection failure or non-2xx status
    #[error("Network error: {0}")]
    Network(#[from] FetchError),

    /// Malformed structured data or no extraction strategy matched
    #[error("Parse error: {0}")]
    Parse(String),

    /// Lookup returned zero results
    #[error("Not found: {0}")]
    NotFound(String),

    /// Credential for a structured lookup is absent
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),
}

/// Source resolver contract
///
/// # Example
/// ```rust,ignore
/// let resolver = LetterboxdResolver::new(fetcher, true)?;
/// let rating = resolver.resolve(&RatingQuery::new("Heat")).await?;
/// ```
#[async_trait::async_trait]
pub trait RatingResolver: Send + Sync {
    /// Slot this resolver fills
    fn source(&self) -> RatingSource;

    /// Produce the source's rating text for a title
    ///
    /// # Errors
    /// Any fetch or parse failure; the caller degrades it to unavailable.
    async fn resolve(&self, query: &RatingQuery) -> Result<String, ResolveError>;
}
