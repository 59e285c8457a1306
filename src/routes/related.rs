use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{error::AppResult, models::RelatedItem, routes::AppState};

#[derive(Debug, Deserialize)]
pub struct RelatedQuery {
    limit: Option<usize>,
}

/// Handler for the related-items serving read
///
/// A constant-time lookup against the last committed batch result. An item
/// with no stored relationships (e.g. added after the last run) yields an
/// empty list, never an error.
pub async fn get_related(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<i64>,
    Query(params): Query<RelatedQuery>,
) -> AppResult<Json<Vec<RelatedItem>>> {
    let limit = params.limit.unwrap_or(state.top_n).clamp(1, state.top_n);
    let related = state.store.get_related(item_id, limit).await?;
    Ok(Json(related))
}
