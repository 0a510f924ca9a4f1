//! Test Helper Utilities
//!
//! Shared fakes and page fixtures for the reelrate-ratings integration tests

#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use reelrate_common::config::TomlConfig;
use reelrate_ratings::fetch::{FetchError, Fetcher};
use reelrate_ratings::{build_aggregator_with, Credentials, RatingAggregator};
use std::sync::{Arc, Mutex};

/// Scripted in-memory fetcher
///
/// Routes are matched in insertion order; the first pattern contained in the
/// requested URL wins. Unmatched URLs answer 404. Every request is recorded.
#[derive(Default)]
pub struct ScriptedFetcher {
    routes: Vec<(String, Result<String, u16>)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, pattern: &str, body: &str) -> Self {
        self.routes.push((pattern.to_string(), Ok(body.to_string())));
        self
    }

    pub fn fail(mut self, pattern: &str, status: u16) -> Self {
        self.routes.push((pattern.to_string(), Err(status)));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Requests whose URL contains `pattern`
    pub fn calls_matching(&self, pattern: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.contains(pattern))
            .count()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.routes.iter().find(|(pattern, _)| url.contains(pattern.as_str())) {
            Some((_, Ok(body))) => Ok(body.clone()),
            Some((_, Err(status))) => Err(FetchError::Status(*status)),
            None => Err(FetchError::Status(404)),
        }
    }
}

/// Test configuration: defaults with the web search tier on
pub fn test_config() -> TomlConfig {
    TomlConfig::default()
}

pub fn test_credentials() -> Credentials {
    Credentials {
        tmdb_api_key: Some("tmdb-test-key".to_string()),
        omdb_api_key: Some("omdb-test-key".to_string()),
    }
}

/// Production wiring over a scripted fetcher
pub fn aggregator_over(fetcher: Arc<ScriptedFetcher>, config: &TomlConfig) -> RatingAggregator {
    build_aggregator_with(config, test_credentials(), fetcher).unwrap()
}

/// Fetcher answering every upstream for "The Matrix" (TMDB id 603)
pub fn matrix_fetcher() -> ScriptedFetcher {
    ScriptedFetcher::new()
        .respond("append_to_response=videos", fixtures::TMDB_DETAILS)
        .respond("append_to_response=external_ids", fixtures::TMDB_EXTERNAL_IDS)
        .respond("/search/movie", fixtures::TMDB_SEARCH)
        .respond("imdb.com/title/tt0133093/", fixtures::IMDB_PAGE)
        .respond("omdbapi.com", fixtures::OMDB_RESPONSE)
        .respond("letterboxd.com/film/the-matrix/", fixtures::LETTERBOXD_PAGE)
}
