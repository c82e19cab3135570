use async_trait::async_trait;

use crate::types::ExtractedContent;
use crate::Result;

/// One content extraction strategy.
///
/// Implementations return `Err` on any failure so callers can move on to the
/// next strategy. The infallible "always returns content" behaviour lives in
/// the orchestrator.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn fetch(&self, url: &str) -> Result<ExtractedContent>;
}
