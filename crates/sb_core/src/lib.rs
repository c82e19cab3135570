pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod storage;
pub mod types;

pub use config::ExtractionConfig;
pub use error::{Error, Result};
pub use fetch::ContentFetcher;
pub use models::TextGenerator;
pub use storage::ArticleCache;
pub use types::{
    ArticleReference, ArticleResponse, ChartPoint, ChartRecord, ChartType, ExtractedContent,
};
