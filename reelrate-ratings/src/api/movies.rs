//! Movie rating and search endpoints

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{error, info};

use crate::error::{ApiError, ApiResult};
use crate::types::{AggregateRating, SearchResponse};
use crate::AppState;

/// Query string of `GET /api/search`
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// GET /api/movie/:id
///
/// Always a fully shaped record; unavailable sources read `"N/A"`.
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AggregateRating>> {
    let movie_id = parse_movie_id(&id)?;
    info!(movie_id, "Movie ratings requested");

    let record = state.aggregator.aggregate(movie_id).await.map_err(|e| {
        error!(movie_id, error = %e, "Metadata lookup failed");
        ApiError::MovieDetails(e)
    })?;

    Ok(Json(record))
}

/// GET /api/search?q=
pub async fn search_movies(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResponse>> {
    let query = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Query parameter is required".to_string()))?;

    let response = state.aggregator.search(query).await.map_err(|e| {
        error!(query = %query, error = %e, "Movie search failed");
        ApiError::Search(e)
    })?;

    Ok(Json(response))
}

fn parse_movie_id(raw: &str) -> ApiResult<u64> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::BadRequest("Invalid movie ID".to_string()))
}

/// Build movie routes
pub fn movie_routes() -> Router<AppState> {
    Router::new()
        .route("/api/movie/:id", get(get_movie))
        .route("/api/search", get(search_movies))
}
