//! TMDB (The Movie Database) v3 client
//!
//! # API Reference
//! - Search: `GET /search/movie?query=...`
//! - Details: `GET /movie/{id}?append_to_response=videos`
//! - External IDs: `GET /movie/{id}?append_to_response=external_ids`
//!
//! Request URLs carry the API key and are never logged.

use super::{poster_url, release_year, MetadataError, MetadataProvider, MovieDetails, Video};
use crate::fetch::Fetcher;
use crate::types::MovieSummary;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// TMDB API base URL
pub const TMDB_API_URL: &str = "https://api.themoviedb.org/3";

/// TMDB client over a shared fetcher
pub struct TmdbClient {
    fetcher: Arc<dyn Fetcher>,
    api_key: Option<String>,
    base_url: String,
}

impl TmdbClient {
    /// Create a client; a missing key fails every call with `ConfigurationMissing`
    pub fn new(fetcher: Arc<dyn Fetcher>, api_key: Option<String>) -> Self {
        Self {
            fetcher,
            api_key,
            base_url: TMDB_API_URL.to_string(),
        }
    }

    /// Point the client at another base URL (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn key(&self) -> Result<&str, MetadataError> {
        self.api_key
            .as_deref()
            .ok_or(MetadataError::ConfigurationMissing)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, MetadataError> {
        let body = self.fetcher.get_text(url).await?;
        serde_json::from_str(&body).map_err(|e| MetadataError::Parse(e.to_string()))
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, MetadataError> {
        let url = format!(
            "{}/search/movie?api_key={}&query={}",
            self.base_url,
            self.key()?,
            urlencoding::encode(query)
        );

        let page: SearchPage = self.get_json(&url).await?;
        debug!(query = %query, hits = page.results.len(), "TMDB search complete");

        Ok(page
            .results
            .into_iter()
            .map(|hit| MovieSummary {
                id: hit.id,
                title: hit.title,
                year: release_year(hit.release_date.as_deref()),
                poster: poster_url(hit.poster_path.as_deref()),
            })
            .collect())
    }

    async fn details(&self, id: u64) -> Result<MovieDetails, MetadataError> {
        let url = format!(
            "{}/movie/{}?api_key={}&append_to_response=videos",
            self.base_url,
            id,
            self.key()?
        );

        let movie: MovieResponse = self.get_json(&url).await?;
        debug!(
            movie_id = id,
            title = %movie.title,
            release_date = ?movie.release_date,
            "TMDB details retrieved"
        );

        Ok(MovieDetails {
            id: movie.id,
            title: movie.title,
            release_date: movie.release_date,
            overview: movie.overview,
            poster_path: movie.poster_path,
            vote_average: movie.vote_average,
            videos: movie.videos.map(|v| v.results).unwrap_or_default(),
        })
    }

    async fn imdb_id(&self, id: u64) -> Result<String, MetadataError> {
        let url = format!(
            "{}/movie/{}?api_key={}&append_to_response=external_ids",
            self.base_url,
            id,
            self.key()?
        );

        let movie: MovieResponse = self.get_json(&url).await?;
        movie
            .external_ids
            .and_then(|ids| ids.imdb_id)
            .filter(|imdb_id| !imdb_id.is_empty())
            .ok_or_else(|| MetadataError::NotFound(format!("no IMDb id for movie {}", id)))
    }
}

// ============================================================================
// TMDB API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: u64,
    #[serde(default)]
    title: String,
    release_date: Option<String>,
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MovieResponse {
    id: u64,
    #[serde(default)]
    title: String,
    release_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    vote_average: Option<f64>,
    videos: Option<VideoList>,
    external_ids: Option<ExternalIds>,
}

#[derive(Debug, Deserialize)]
struct VideoList {
    #[serde(default)]
    results: Vec<Video>,
}

#[derive(Debug, Deserialize)]
struct ExternalIds {
    imdb_id: Option<String>,
}
