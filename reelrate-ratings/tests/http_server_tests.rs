//! HTTP Server & Routing Integration Tests
//!
//! Router built over the production aggregator wiring with a scripted
//! fetcher, exercised in-process with `oneshot`.

mod helpers;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use helpers::{aggregator_over, fixtures, matrix_fetcher, test_config, ScriptedFetcher};
use http_body_util::BodyExt;
use reelrate_common::config::RateLimitConfig;
use reelrate_ratings::api::client_rate_limiter;
use reelrate_ratings::{build_router, AppState};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

fn app_with(fetcher: ScriptedFetcher, rate_limit: RateLimitConfig, static_dir: &Path) -> Router {
    let aggregator = aggregator_over(Arc::new(fetcher), &test_config());
    build_router(
        AppState::new(Arc::new(aggregator)),
        client_rate_limiter(&rate_limit),
        static_dir,
    )
}

fn app(fetcher: ScriptedFetcher) -> Router {
    app_with(fetcher, RateLimitConfig::default(), Path::new("public"))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = app(ScriptedFetcher::new()).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "reelrate-ratings");
    assert_eq!(body["cache_entries"], 0);
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_movie_endpoint_returns_full_record() {
    let response = app(matrix_fetcher()).oneshot(get("/api/movie/603")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["movieId"], 603);
    assert_eq!(body["title"], "The Matrix");
    assert_eq!(body["year"], "1999");
    assert_eq!(body["trailer"], "https://www.youtube.com/embed/vKQi3bBA1y8");
    assert_eq!(
        body["ratings"],
        json!({
            "imdb": "8.7",
            "rottenTomatoes": "83%",
            "letterboxd": "4.2",
            "tmdb": "8.2"
        })
    );
}

#[tokio::test]
async fn test_movie_endpoint_uses_sentinel_for_failed_sources() {
    let fetcher =
        ScriptedFetcher::new().respond("append_to_response=videos", fixtures::TMDB_DETAILS);
    let response = app(fetcher).oneshot(get("/api/movie/603")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["ratings"]["imdb"], "N/A");
    assert_eq!(body["ratings"]["rottenTomatoes"], "N/A");
    assert_eq!(body["ratings"]["letterboxd"], "N/A");
}

#[tokio::test]
async fn test_movie_metadata_failure_is_500() {
    let fetcher = ScriptedFetcher::new().fail("append_to_response=videos", 404);
    let response = app(fetcher).oneshot(get("/api/movie/603")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Failed to fetch movie details: "));
    assert!(!message.contains("tmdb-test-key"), "credentials never leak");
}

#[tokio::test]
async fn test_invalid_movie_id_is_400() {
    for uri in ["/api/movie/abc", "/api/movie/%20", "/api/movie/0"] {
        let response = app(ScriptedFetcher::new()).oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(json_body(response).await, json!({ "error": "Invalid movie ID" }));
    }
}

#[tokio::test]
async fn test_search_requires_query() {
    for uri in ["/api/search", "/api/search?q=", "/api/search?q=%20%20"] {
        let response = app(ScriptedFetcher::new()).oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(
            json_body(response).await,
            json!({ "error": "Query parameter is required" })
        );
    }
}

#[tokio::test]
async fn test_empty_search_is_not_an_error() {
    let fetcher = ScriptedFetcher::new().respond("/search/movie", fixtures::TMDB_SEARCH_EMPTY);
    let response = app(fetcher).oneshot(get("/api/search?q=zzzz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "multipleResults": false, "movies": [] })
    );
}

#[tokio::test]
async fn test_search_with_results() {
    let fetcher = ScriptedFetcher::new().respond("/search/movie", fixtures::TMDB_SEARCH);
    let response = app(fetcher).oneshot(get("/api/search?q=matrix")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["multipleResults"], true);
    assert_eq!(
        body["movies"][0],
        json!({
            "id": 603,
            "title": "The Matrix",
            "year": "1999",
            "poster": "https://image.tmdb.org/t/p/w500/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg"
        })
    );
    assert_eq!(body["movies"][1]["poster"], Value::Null);
}

#[tokio::test]
async fn test_search_upstream_failure_is_500_with_details() {
    let fetcher = ScriptedFetcher::new().fail("/search/movie", 503);
    let response = app(fetcher).oneshot(get("/api/search?q=matrix")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert_eq!(body["error"], "Failed to fetch movie search results");
    assert!(body["details"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://example.com")
        .body(Body::empty())
        .unwrap();
    let response = app(ScriptedFetcher::new()).oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_rate_limit_rejects_excess_requests() {
    let fetcher = ScriptedFetcher::new().respond("/search/movie", fixtures::TMDB_SEARCH_EMPTY);
    let app = app_with(
        fetcher,
        RateLimitConfig {
            window_secs: 900,
            max_requests: 2,
        },
        Path::new("public"),
    );

    for _ in 0..2 {
        let response = app.clone().oneshot(get("/api/search?q=zzzz")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.clone().oneshot(get("/api/search?q=zzzz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(json_body(response).await["error"].is_string());

    // Health is outside the limited routes
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_static_files_are_served_as_fallback() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>reelrate</h1>").unwrap();

    let app = app_with(ScriptedFetcher::new(), RateLimitConfig::default(), dir.path());

    let response = app.clone().oneshot(get("/index.html")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"<h1>reelrate</h1>");

    let response = app.oneshot(get("/missing.css")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
