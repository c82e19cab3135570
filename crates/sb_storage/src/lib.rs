pub mod cache;
pub mod catalog;

pub use cache::{CacheStats, ResultCache};
pub use catalog::ArticleCatalog;

pub mod prelude {
    pub use super::cache::ResultCache;
    pub use super::catalog::ArticleCatalog;
    pub use sb_core::{ArticleCache, ArticleReference, ArticleResponse, Result};
}
