//! Store summary endpoint

use axum::{extract::State, Json};

use crate::catalog::StoreSummary;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/summary
///
/// Row counts per entity table and the most recent load record.
pub async fn get_summary(State(state): State<AppState>) -> ApiResult<Json<StoreSummary>> {
    Ok(Json(state.catalog.summary().await?))
}
