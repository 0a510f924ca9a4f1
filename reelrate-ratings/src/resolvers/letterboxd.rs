//! Letterboxd resolver (secondary HTML scrape with search fallback)
//!
//! Locating the film page is a three-tier fallback:
//! 1. Direct URL built from the hyphen slug of the title
//! 2. Letterboxd's own film search, first result's detail page
//! 3. Web search for "<title> letterboxd rating", first film link
//!    (only when web search is enabled)
//!
//! Whichever tier produces a page, the Letterboxd chain runs against it. If
//! no tier produces a page the resolver stops there.

use super::run_chain;
use crate::extractors::{letterboxd, ChainError, StrategyChain};
use crate::fetch::Fetcher;
use crate::slug::{slugify, SlugStyle};
use crate::types::{RatingQuery, RatingResolver, RatingSource, ResolveError};
use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::debug;

/// Letterboxd site base URL
pub const LETTERBOXD_URL: &str = "https://letterboxd.com";

/// Web search endpoint used by the last tier
pub const WEB_SEARCH_URL: &str = "https://www.google.com/search";

/// Path fragment identifying a film detail page
const FILM_PATH: &str = "letterboxd.com/film/";

/// Selectors for the site search result list
struct SearchSelectors {
    first_result: Selector,
    poster: Selector,
    poster_link: Selector,
    title_link: Selector,
    any_link: Selector,
    redirect: Regex,
}

impl SearchSelectors {
    fn compile() -> Result<Self, ChainError> {
        let selector = |name: &'static str, css: &str| {
            Selector::parse(css).map_err(|e| ChainError::InvalidSelector {
                strategy: name,
                message: e.to_string(),
            })
        };

        Ok(Self {
            first_result: selector("search-result", ".results li.film")?,
            poster: selector("search-poster", ".film-poster")?,
            poster_link: selector("search-poster-link", ".film-poster a")?,
            title_link: selector("search-title-link", "h2.title a")?,
            any_link: selector("web-search-link", "a[href]")?,
            redirect: Regex::new(r"url\?q=([^&]+)").map_err(|source| {
                ChainError::InvalidPattern {
                    strategy: "web-search-redirect",
                    source,
                }
            })?,
        })
    }
}

pub struct LetterboxdResolver {
    fetcher: Arc<dyn Fetcher>,
    chain: StrategyChain,
    selectors: SearchSelectors,
    web_search: bool,
    site_base: String,
    web_search_base: String,
}

impl LetterboxdResolver {
    /// `web_search` enables the third tier
    pub fn new(fetcher: Arc<dyn Fetcher>, web_search: bool) -> Result<Self, ChainError> {
        Ok(Self {
            fetcher,
            chain: letterboxd::chain()?,
            selectors: SearchSelectors::compile()?,
            web_search,
            site_base: LETTERBOXD_URL.to_string(),
            web_search_base: WEB_SEARCH_URL.to_string(),
        })
    }

    pub fn with_site_base(mut self, site_base: impl Into<String>) -> Self {
        self.site_base = site_base.into();
        self
    }

    pub fn with_web_search_base(mut self, web_search_base: impl Into<String>) -> Self {
        self.web_search_base = web_search_base.into();
        self
    }

    /// Walk the tiers until one yields the film page
    async fn locate_film_page(&self, query: &RatingQuery) -> Result<String, ResolveError> {
        let slug = slugify(query.title(), SlugStyle::Hyphen);
        if !slug.is_empty() {
            let direct_url = format!("{}/film/{}/", self.site_base, slug);
            debug!(url = %direct_url, "Trying direct Letterboxd URL");
            match self.fetcher.get_text(&direct_url).await {
                Ok(html) => return Ok(html),
                Err(e) => debug!(error = %e, "Direct URL failed, trying site search"),
            }
        }

        match self.via_site_search(query).await {
            Ok(html) => return Ok(html),
            Err(e) => debug!(error = %e, "Letterboxd search failed"),
        }

        if !self.web_search {
            return Err(ResolveError::NotFound(format!(
                "no Letterboxd page for '{}'",
                query.title()
            )));
        }

        debug!("Trying web search for Letterboxd page");
        self.via_web_search(query).await
    }

    async fn via_site_search(&self, query: &RatingQuery) -> Result<String, ResolveError> {
        let search_url = format!(
            "{}/search/films/{}/",
            self.site_base,
            urlencoding::encode(query.title())
        );
        let results = self.fetcher.get_text(&search_url).await?;

        let link = self
            .first_search_result(&results)
            .ok_or_else(|| ResolveError::NotFound("empty Letterboxd search results".to_string()))?;
        let film_url = if link.starts_with("http") {
            link
        } else {
            format!("{}{}", self.site_base, link)
        };

        debug!(url = %film_url, "Fetching Letterboxd search result");
        Ok(self.fetcher.get_text(&film_url).await?)
    }

    async fn via_web_search(&self, query: &RatingQuery) -> Result<String, ResolveError> {
        let terms = format!("{} letterboxd rating", query.title());
        let search_url = format!("{}?q={}", self.web_search_base, urlencoding::encode(&terms));
        let results = self.fetcher.get_text(&search_url).await?;

        let film_url = self
            .first_film_link(&results)
            .ok_or_else(|| {
                ResolveError::NotFound("no Letterboxd link in web results".to_string())
            })?;

        debug!(url = %film_url, "Fetching Letterboxd page from web search");
        Ok(self.fetcher.get_text(&film_url).await?)
    }

    /// Detail-page link of the first site search result
    fn first_search_result(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let result = document.select(&self.selectors.first_result).next()?;

        let from_poster = result
            .select(&self.selectors.poster)
            .find_map(|el| el.value().attr("data-target-link"));
        let from_poster_link = || {
            result
                .select(&self.selectors.poster_link)
                .find_map(|el| el.value().attr("href"))
        };
        let from_title = || {
            result
                .select(&self.selectors.title_link)
                .find_map(|el| el.value().attr("href"))
        };

        from_poster
            .or_else(from_poster_link)
            .or_else(from_title)
            .filter(|link| !link.is_empty())
            .map(str::to_string)
    }

    /// First Letterboxd film link in web results, unwrapping `/url?q=` redirects
    fn first_film_link(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let href = document
            .select(&self.selectors.any_link)
            .filter_map(|el| el.value().attr("href"))
            .find(|href| href.contains(FILM_PATH))?;

        let target = self
            .selectors
            .redirect
            .captures(href)
            .and_then(|c| c.get(1))
            .and_then(|m| urlencoding::decode(m.as_str()).ok())
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|| href.to_string());

        Some(target)
    }
}

#[async_trait]
impl RatingResolver for LetterboxdResolver {
    fn source(&self) -> RatingSource {
        RatingSource::Letterboxd
    }

    async fn resolve(&self, query: &RatingQuery) -> Result<String, ResolveError> {
        let html = self.locate_film_page(query).await?;
        run_chain(&self.chain, &html, RatingSource::Letterboxd)
    }
}
