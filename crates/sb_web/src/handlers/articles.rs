use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::{ApiError, AppState};

pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "NASA Space Biology API" }))
}

pub async fn api_test() -> impl IntoResponse {
    Json(json!({
        "status": "Backend is running",
        "endpoints": ["/api/datasets", "/api/dataset/{id}", "/articles"],
    }))
}

pub async fn list_articles(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.catalog.articles().to_vec())
}

/// The fetch runs on its own task: a client hanging up does not cancel it,
/// and the result still lands in the cache.
pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<usize>,
) -> Result<impl IntoResponse, ApiError> {
    let article = state
        .catalog
        .get(id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound("Article not found".to_string()))?;

    let response = state
        .orchestrator
        .spawn_article_content(article)
        .await
        .map_err(|e| ApiError::Internal(format!("article task failed: {}", e)))?;
    Ok(Json(response))
}
