use axum::{extract::State, response::IntoResponse, Json};
use sb_inference::extract_numerical_data;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ArticleRequest {
    pub title: String,
    pub content: String,
}

/// Missing fields are treated as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub question: String,
    pub article_content: String,
    pub article_title: String,
}

pub async fn summarize(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TextRequest>,
) -> impl IntoResponse {
    let summary = state.analyzer.summarize(&request.text).await;
    Json(json!({ "summary": summary }))
}

pub async fn structured_summary(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ArticleRequest>,
) -> impl IntoResponse {
    let summary = state
        .analyzer
        .structured_summary(&request.title, &request.content)
        .await;
    Json(json!({ "structured_summary": summary }))
}

pub async fn keywords(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TextRequest>,
) -> impl IntoResponse {
    let keywords = state.analyzer.keywords(&request.text).await;
    Json(json!({ "keywords": keywords }))
}

/// Chart data from the regex signal extractor. The title is accepted for
/// compatibility but not used.
pub async fn extract_data(Json(request): Json<ArticleRequest>) -> impl IntoResponse {
    Json(json!({ "chart_data": extract_numerical_data(&request.content) }))
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    Json(
        state
            .analyzer
            .chat(&request.question, &request.article_title, &request.article_content)
            .await,
    )
}

pub async fn comprehensive_summary(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ArticleRequest>,
) -> impl IntoResponse {
    Json(
        state
            .analyzer
            .comprehensive_summary(&request.title, &request.content)
            .await,
    )
}

pub async fn hybrid_summary(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TextRequest>,
) -> impl IntoResponse {
    Json(state.summarizer.summarize(&request.text).await)
}
