use async_trait::async_trait;

use crate::types::ArticleResponse;

/// Memoization of article responses keyed by catalog id.
#[async_trait]
pub trait ArticleCache: Send + Sync {
    /// Get a stored response, if any
    async fn get(&self, id: usize) -> Option<ArticleResponse>;

    /// Store a response, replacing any previous value for the same id
    async fn put(&self, id: usize, response: ArticleResponse);
}
