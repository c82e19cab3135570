use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Thresholds and timings used by the fetchers, the orchestrator and the cache.
///
/// The length and size limits are empirical. They are kept here rather than
/// inlined so deployments can tune them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// A static fetch shorter than this is rejected in favour of rendering.
    pub min_static_content_len: usize,
    pub static_min_paragraph_len: usize,
    pub rendered_min_paragraph_len: usize,
    pub min_heading_len: usize,
    pub min_blockquote_len: usize,
    /// Images declaring a smaller width or height are treated as icons.
    pub min_image_dimension: u32,
    pub render_timeout_ms: u64,
    pub navigation_timeout_ms: u64,
    pub settle_delay_ms: u64,
    pub politeness_delay_min_ms: u64,
    pub politeness_delay_max_ms: u64,
    pub request_timeout_ms: u64,
    pub cache_capacity: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_static_content_len: 500,
            static_min_paragraph_len: 30,
            rendered_min_paragraph_len: 20,
            min_heading_len: 2,
            min_blockquote_len: 20,
            min_image_dimension: 50,
            render_timeout_ms: 8_000,
            navigation_timeout_ms: 30_000,
            settle_delay_ms: 1_000,
            politeness_delay_min_ms: 1_000,
            politeness_delay_max_ms: 3_000,
            request_timeout_ms: 15_000,
            cache_capacity: 256,
        }
    }
}

impl ExtractionConfig {
    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Inclusive bounds of the random pause taken before a static request.
    pub fn politeness_delay_bounds(&self) -> (u64, u64) {
        let min = self.politeness_delay_min_ms;
        (min, self.politeness_delay_max_ms.max(min))
    }
}
