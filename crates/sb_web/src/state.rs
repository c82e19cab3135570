use std::sync::Arc;

use sb_core::TextGenerator;
use sb_inference::{ArticleAnalyzer, HybridSummarizer};
use sb_scrapers::ContentOrchestrator;
use sb_storage::ArticleCatalog;

use crate::osdr::OsdrClient;

pub struct AppState {
    pub catalog: Arc<ArticleCatalog>,
    pub orchestrator: Arc<ContentOrchestrator>,
    pub analyzer: ArticleAnalyzer,
    pub summarizer: HybridSummarizer,
    pub osdr: OsdrClient,
}

impl AppState {
    pub fn new(
        catalog: ArticleCatalog,
        orchestrator: ContentOrchestrator,
        model: Arc<dyn TextGenerator>,
        osdr: OsdrClient,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            orchestrator: Arc::new(orchestrator),
            analyzer: ArticleAnalyzer::new(model.clone()),
            summarizer: HybridSummarizer::new(model),
            osdr,
        }
    }
}
