//! Movie metadata collaborator
//!
//! The metadata provider is the canonical source of titles. Its failures are
//! the only ones fatal to an aggregation: without a title no resolver has
//! meaningful input.

pub mod tmdb;

use crate::fetch::FetchError;
use crate::types::MovieSummary;
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub use tmdb::TmdbClient;

/// Poster image base (w500 rendition)
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Embeddable trailer base
pub const TRAILER_BASE_URL: &str = "https://www.youtube.com/embed/";

/// Metadata lookup failure
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata request failed: {0}")]
    Network(#[from] FetchError),

    #[error("malformed metadata response: {0}")]
    Parse(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("metadata API key not configured")]
    ConfigurationMissing,
}

/// Video attached to a movie (trailers, teasers, featurettes)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Video {
    /// Hosting platform, e.g. "YouTube"
    pub site: String,
    /// Role, e.g. "Trailer"
    #[serde(rename = "type")]
    pub kind: String,
    /// Platform-specific video key
    pub key: String,
}

/// Movie details as returned by the provider
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MovieDetails {
    pub id: u64,
    pub title: String,
    /// "YYYY-MM-DD" when known
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
    pub videos: Vec<Video>,
}

impl MovieDetails {
    /// Release year, or "Unknown"
    pub fn year(&self) -> String {
        release_year(self.release_date.as_deref())
    }

    /// Overview, or a placeholder when empty
    pub fn plot(&self) -> String {
        match self.overview.as_deref() {
            Some(overview) if !overview.trim().is_empty() => overview.to_string(),
            _ => "No plot available".to_string(),
        }
    }

    pub fn poster_url(&self) -> Option<String> {
        poster_url(self.poster_path.as_deref())
    }

    /// First YouTube trailer, as an embed URL
    pub fn trailer_url(&self) -> Option<String> {
        self.videos
            .iter()
            .find(|v| v.site == "YouTube" && v.kind == "Trailer")
            .map(|v| format!("{}{}", TRAILER_BASE_URL, v.key))
    }

    /// Provider's own score with one decimal; zero means "no votes"
    pub fn native_score(&self) -> Option<String> {
        self.vote_average
            .filter(|score| *score > 0.0)
            .map(|score| format!("{:.1}", score))
    }
}

/// "YYYY-MM-DD" → "YYYY"; missing or blank → "Unknown"
pub fn release_year(release_date: Option<&str>) -> String {
    release_date
        .and_then(|date| date.split('-').next())
        .filter(|year| !year.is_empty())
        .unwrap_or("Unknown")
        .to_string()
}

pub fn poster_url(poster_path: Option<&str>) -> Option<String> {
    poster_path
        .filter(|path| !path.is_empty())
        .map(|path| format!("{}{}", POSTER_BASE_URL, path))
}

/// Metadata provider contract
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Title search; zero hits is an empty list, not an error
    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, MetadataError>;

    /// Full details for one movie
    async fn details(&self, id: u64) -> Result<MovieDetails, MetadataError>;

    /// IMDb identifier ("tt0133093") for one movie
    async fn imdb_id(&self, id: u64) -> Result<String, MetadataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(site: &str, kind: &str, key: &str) -> Video {
        Video {
            site: site.into(),
            kind: kind.into(),
            key: key.into(),
        }
    }

    #[test]
    fn test_trailer_picks_first_youtube_trailer() {
        let details = MovieDetails {
            videos: vec![
                video("YouTube", "Teaser", "teaser1"),
                video("Vimeo", "Trailer", "vimeo1"),
                video("YouTube", "Trailer", "yt1"),
                video("YouTube", "Trailer", "yt2"),
            ],
            ..Default::default()
        };
        assert_eq!(
            details.trailer_url().as_deref(),
            Some("https://www.youtube.com/embed/yt1")
        );
    }

    #[test]
    fn test_no_trailer_is_absent() {
        let details = MovieDetails {
            videos: vec![video("YouTube", "Clip", "c1")],
            ..Default::default()
        };
        assert_eq!(details.trailer_url(), None);
    }

    #[test]
    fn test_derived_fields() {
        let details = MovieDetails {
            id: 603,
            title: "The Matrix".into(),
            release_date: Some("1999-03-30".into()),
            overview: Some("".into()),
            poster_path: Some("/p.jpg".into()),
            vote_average: Some(8.218),
            videos: vec![],
        };
        assert_eq!(details.year(), "1999");
        assert_eq!(details.plot(), "No plot available");
        assert_eq!(
            details.poster_url().as_deref(),
            Some("https://image.tmdb.org/t/p/w500/p.jpg")
        );
        assert_eq!(details.native_score().as_deref(), Some("8.2"));
    }

    #[test]
    fn test_missing_values_use_placeholders() {
        let details = MovieDetails::default();
        assert_eq!(details.year(), "Unknown");
        assert_eq!(details.poster_url(), None);
        assert_eq!(details.native_score(), None);
        assert_eq!(release_year(Some("")), "Unknown");
    }
}
