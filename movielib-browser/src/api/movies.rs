//! Movie listing and title search
//!
//! Both endpoints return every matching row; there is no pagination.

use axum::{
    extract::{Query, State},
    Json,
};
use movielib_common::db::MovieRow;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Query parameters for title search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Substring to look for in titles
    #[serde(default)]
    pub q: String,
}

/// Full listing response
#[derive(Debug, Serialize)]
pub struct MovieListResponse {
    pub store_version: u64,
    pub total_results: usize,
    pub rows: Vec<MovieRow>,
}

/// Search response
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub store_version: u64,
    pub total_results: usize,
    pub rows: Vec<MovieRow>,
}

/// GET /api/movies
///
/// All movies joined to director and genre names, highest rating first.
pub async fn list_movies(State(state): State<AppState>) -> ApiResult<Json<MovieListResponse>> {
    let result = state.catalog.list_all().await?;

    Ok(Json(MovieListResponse {
        store_version: result.store_version,
        total_results: result.rows.len(),
        rows: result.rows.to_vec(),
    }))
}

/// GET /api/movies/search?q=TERM
///
/// Movies whose title contains TERM (literal substring, ASCII case-insensitive).
/// Zero matches is an empty result, not an error.
pub async fn search_movies(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    if query.q.trim().is_empty() {
        return Err(ApiError::BadRequest("Empty search term".to_string()));
    }

    let result = state.catalog.search(&query.q).await?;

    Ok(Json(SearchResponse {
        query: query.q,
        store_version: result.store_version,
        total_results: result.rows.len(),
        rows: result.rows.to_vec(),
    }))
}
