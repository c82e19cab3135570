use std::fmt;

use async_trait::async_trait;

use crate::Result;

/// External text generation service: a prompt goes in, text comes out or the call fails.
#[async_trait]
pub trait TextGenerator: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Generate a completion for `prompt`. An empty completion is returned as is;
    /// callers decide whether it is usable.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
