pub mod analyzer;
pub mod hybrid;
pub mod models;
pub mod signals;

pub use analyzer::{ArticleAnalyzer, ChatAnswer, ComprehensiveSummary};
pub use hybrid::{HybridSummarizer, HybridSummary};
pub use models::create_model;
pub use signals::{extract_keywords, extract_metadata, extract_numerical_data, ArticleMetadata};

/// Text generation settings.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// `gemini` or `dummy`. Unset picks Gemini when an API key is present.
    pub model_name: Option<String>,
    pub api_key: Option<String>,
    /// Provider model id, e.g. `gemini-2.5-flash`.
    pub model_id: Option<String>,
    /// Override of the provider endpoint, mainly for tests and proxies.
    pub base_url: Option<String>,
}

pub mod prelude {
    pub use super::analyzer::ArticleAnalyzer;
    pub use super::models::create_model;
    pub use super::Config;
    pub use sb_core::{ChartRecord, Error, Result, TextGenerator};
}
