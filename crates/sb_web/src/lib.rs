use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod error;
pub mod handlers;
pub mod osdr;
pub mod state;

pub use error::ApiError;
pub use osdr::{DatasetSummary, OsdrClient};
pub use state::AppState;

use handlers::{ai, articles, datasets};

fn ai_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/summarize", post(ai::summarize))
        .route("/structured-summary", post(ai::structured_summary))
        .route("/keywords", post(ai::keywords))
        .route("/extract-data", post(ai::extract_data))
        .route("/chat", post(ai::chat))
        .route("/comprehensive-summary", post(ai::comprehensive_summary))
        .route("/hybrid-summary", post(ai::hybrid_summary))
}

fn dataset_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/datasets", get(datasets::list_datasets))
        .route("/datasets/bulk", get(datasets::bulk_datasets))
        .route("/dataset/:id", get(datasets::get_dataset))
        .route("/dataset/:id/assays", get(datasets::get_dataset_assays))
        .route("/dataset/:id/files", get(datasets::get_dataset_files))
        .route("/dataset/:id/assay/:assay/samples", get(datasets::get_assay_samples))
        .route("/dataset/:id/assay/:assay/files", get(datasets::get_assay_files))
        .route(
            "/dataset/:id/assay/:assay/sample/:sample/files",
            get(datasets::get_sample_files),
        )
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/", get(articles::root))
        .route("/api/test", get(articles::api_test))
        .route("/articles", get(articles::list_articles))
        .route("/articles/:id", get(articles::get_article))
        .nest("/api", dataset_routes())
        .nest("/ai", ai_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::{create_app, ApiError, AppState, OsdrClient};
    pub use sb_core::{Error, Result};
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use sb_core::{ArticleReference, ContentFetcher, ExtractedContent, ExtractionConfig, Result};
    use sb_inference::models::DummyModel;
    use sb_scrapers::ContentOrchestrator;
    use sb_storage::{ArticleCatalog, ResultCache};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    const PROSE: &str = "Mice flown aboard the station lost trabecular bone volume during the mission. ";

    #[derive(Default)]
    struct StubFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ContentFetcher for StubFetcher {
        fn name(&self) -> &str {
            "stub"
        }

        async fn fetch(&self, _url: &str) -> Result<ExtractedContent> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ExtractedContent::message(format!("<p>{}</p>", PROSE.repeat(10))))
        }
    }

    fn make_app(osdr_url: &str) -> (Router, Arc<StubFetcher>) {
        let fetcher = Arc::new(StubFetcher::default());
        let orchestrator = ContentOrchestrator::new(
            fetcher.clone(),
            fetcher.clone(),
            Arc::new(ResultCache::new(8)),
            ExtractionConfig::default(),
        );
        let catalog = ArticleCatalog::new(vec![ArticleReference {
            id: 0,
            title: "Bone loss in spaceflight".to_string(),
            link: "https://example.org/bone".to_string(),
        }]);
        let state = AppState::new(
            catalog,
            orchestrator,
            Arc::new(DummyModel::new()),
            OsdrClient::with_base_url(osdr_url).unwrap(),
        );
        (create_app(state), fetcher)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_root() {
        let (app, _) = make_app("http://127.0.0.1:1");
        let resp = app.oneshot(get("/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["message"], "NASA Space Biology API");
    }

    #[tokio::test]
    async fn test_list_articles() {
        let (app, _) = make_app("http://127.0.0.1:1");
        let resp = app.oneshot(get("/articles")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        let arr = json.as_array().unwrap();
        assert_eq!(arr.len(), 1);
        assert_eq!(arr[0]["id"], 0);
        assert_eq!(arr[0]["link"], "https://example.org/bone");
    }

    #[tokio::test]
    async fn test_get_article_is_cached() {
        let (app, fetcher) = make_app("http://127.0.0.1:1");

        let resp = app.clone().oneshot(get("/articles/0")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["title"], "Bone loss in spaceflight");
        assert!(json["content"].as_str().unwrap().contains("trabecular bone"));
        assert_eq!(json["tables"], serde_json::json!([]));

        let resp = app.oneshot(get("/articles/0")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_article_not_found() {
        let (app, fetcher) = make_app("http://127.0.0.1:1");
        let resp = app.oneshot(get("/articles/7")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["detail"], "Article not found");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chat_summary_request() {
        let (app, _) = make_app("http://127.0.0.1:1");
        let resp = app
            .oneshot(post_json(
                "/ai/chat",
                serde_json::json!({"question": "Can you summarize this?"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["show_summary_button"], true);
    }

    #[tokio::test]
    async fn test_comprehensive_summary() {
        let (app, _) = make_app("http://127.0.0.1:1");
        let resp = app
            .oneshot(post_json(
                "/ai/comprehensive-summary",
                serde_json::json!({
                    "title": "Rodent study",
                    "content": "<p>Results: n=12 and n=14 animals per group.</p>"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["chartData"]["title"], "Sample Sizes");
        assert!(json["keywords"].is_array());
        assert!(!json["summary"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dataset_files_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/dataset/OSD-48/files/")
            .with_status(404)
            .create_async()
            .await;
        let (app, _) = make_app(&server.url());
        let resp = app.oneshot(get("/api/dataset/OSD-48/files")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_dataset_upstream_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/dataset/OSD-48/")
            .with_status(502)
            .create_async()
            .await;
        let (app, _) = make_app(&server.url());
        let resp = app.oneshot(get("/api/dataset/OSD-48")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_json(resp).await["detail"].is_string());
    }
}
