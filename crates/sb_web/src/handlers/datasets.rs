use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::{ApiError, AppState};

pub async fn list_datasets(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.osdr.datasets().await?))
}

pub async fn bulk_datasets(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.osdr.bulk_summaries().await?))
}

pub async fn get_dataset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.osdr.dataset(&id).await?))
}

pub async fn get_dataset_assays(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.osdr.dataset_assays(&id).await?))
}

pub async fn get_dataset_files(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    Json(state.osdr.dataset_files(&id).await)
}

pub async fn get_assay_samples(
    State(state): State<Arc<AppState>>,
    Path((id, assay)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.osdr.assay_samples(&id, &assay).await?))
}

pub async fn get_assay_files(
    State(state): State<Arc<AppState>>,
    Path((id, assay)): Path<(String, String)>,
) -> impl IntoResponse {
    Json(state.osdr.assay_files(&id, &assay).await)
}

pub async fn get_sample_files(
    State(state): State<Arc<AppState>>,
    Path((id, assay, sample)): Path<(String, String, String)>,
) -> impl IntoResponse {
    Json(state.osdr.sample_files(&id, &assay, &sample).await)
}
