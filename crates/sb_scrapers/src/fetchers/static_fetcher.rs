use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use sb_core::{ContentFetcher, Error, ExtractedContent, ExtractionConfig, Result};
use tracing::{debug, info};

use crate::extract::extract_static;
use crate::html::error_content;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Plain HTTP GET followed by static paragraph extraction.
#[derive(Debug, Clone)]
pub struct StaticFetcher {
    client: reqwest::Client,
    config: ExtractionConfig,
}

impl StaticFetcher {
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert("upgrade-insecure-requests", HeaderValue::from_static("1"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .gzip(true)
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    fn politeness_delay(&self) -> Duration {
        let (min, max) = self.config.politeness_delay_bounds();
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    async fn download(&self, url: &str) -> Result<String> {
        let delay = self.politeness_delay();
        if !delay.is_zero() {
            debug!("⏳ Waiting {:?} before fetching {}", delay, url);
            tokio::time::sleep(delay).await;
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Scraping(format!("{} returned HTTP {}", url, status)));
        }
        Ok(response.text().await?)
    }

    /// Never fails: errors come back as a `<p>` error payload.
    pub async fn fetch_static(&self, url: &str) -> ExtractedContent {
        match self.fetch(url).await {
            Ok(content) => content,
            Err(e) => error_content("Error fetching article", &e),
        }
    }
}

#[async_trait]
impl ContentFetcher for StaticFetcher {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self, url: &str) -> Result<ExtractedContent> {
        url::Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
        let html = self.download(url).await?;
        let extracted = extract_static(&html, &self.config);
        info!("📄 Static extraction of {} produced {} chars", url, extracted.content.len());
        Ok(extracted)
    }
}
