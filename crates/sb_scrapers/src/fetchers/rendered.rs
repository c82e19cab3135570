//! Headless-browser fetching.
//!
//! A browser is launched per fetch and owned by a [`SessionGuard`]. The guard
//! closes it on the normal path and aborts it from `Drop` on any other exit,
//! unwinding included.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sb_core::{ContentFetcher, Error, ExtractedContent, ExtractionConfig, Result};
use tracing::{debug, info, warn};

use crate::extract::extract_rendered;
use crate::extract::rendered::PAGE_NOISE_SELECTORS;
use crate::html::error_content;

/// Starts browser processes. One session per fetch.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}

/// A live browser with a single tab.
#[async_trait]
pub trait BrowserSession: Send {
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Resolves once `<body>` exists. Callers bound the wait.
    async fn wait_for_body(&mut self) -> Result<()>;

    async fn evaluate(&mut self, script: &str) -> Result<()>;

    /// Serialized DOM of the current page.
    async fn page_source(&mut self) -> Result<String>;

    /// Orderly shutdown.
    async fn close(&mut self) -> Result<()>;

    /// Best-effort shutdown usable from `Drop`. Must not block.
    fn abort(&mut self);
}

/// Owns a session until it is released.
pub struct SessionGuard {
    session: Option<Box<dyn BrowserSession>>,
}

impl SessionGuard {
    pub fn new(session: Box<dyn BrowserSession>) -> Self {
        Self {
            session: Some(session),
        }
    }

    pub fn session_mut(&mut self) -> Result<&mut Box<dyn BrowserSession>> {
        self.session
            .as_mut()
            .ok_or_else(|| Error::Browser("browser session already released".to_string()))
    }

    /// Close the session, aborting it if the close fails or outlives `limit`.
    pub async fn release(mut self, limit: Duration) {
        if let Some(mut session) = self.session.take() {
            if let Err(e) = bounded(limit, "closing the browser", session.close()).await {
                warn!("⚠️ Browser did not close cleanly, aborting: {}", e);
                session.abort();
            }
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.take() {
            debug!("Aborting browser session dropped without release");
            session.abort();
        }
    }
}

fn noise_removal_script() -> String {
    format!(
        "document.querySelectorAll('{}').forEach(function (el) {{ el.remove(); }});",
        PAGE_NOISE_SELECTORS.join(", ")
    )
}

async fn bounded<T>(limit: Duration, step: &str, work: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(limit, work)
        .await
        .map_err(|_| Error::Timeout(format!("{} took longer than {:?}", step, limit)))?
}

/// Fetcher that renders the page in a headless browser before extracting.
#[derive(Clone)]
pub struct RenderingFetcher {
    driver: Arc<dyn BrowserDriver>,
    config: ExtractionConfig,
}

impl RenderingFetcher {
    pub fn new(driver: Arc<dyn BrowserDriver>, config: ExtractionConfig) -> Self {
        Self { driver, config }
    }

    async fn render(&self, session: &mut dyn BrowserSession, url: &str) -> Result<String> {
        bounded(self.config.navigation_timeout(), "navigation", session.navigate(url)).await?;
        bounded(self.config.render_timeout(), "waiting for <body>", session.wait_for_body()).await?;

        let settle = self.config.settle_delay();
        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }

        let script = noise_removal_script();
        let cleanup = session.evaluate(&script);
        if let Err(e) = bounded(self.config.render_timeout(), "noise removal", cleanup).await {
            debug!("Noise removal script failed on {}: {}", url, e);
        }

        bounded(self.config.navigation_timeout(), "reading page source", session.page_source()).await
    }

    /// Never fails: errors come back as a `<p>` error payload.
    pub async fn fetch_rendered(&self, url: &str) -> ExtractedContent {
        match self.fetch(url).await {
            Ok(content) => content,
            Err(e) => error_content("Error rendering article", &e),
        }
    }
}

#[async_trait]
impl ContentFetcher for RenderingFetcher {
    fn name(&self) -> &str {
        "rendered"
    }

    async fn fetch(&self, url: &str) -> Result<ExtractedContent> {
        url::Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;

        let mut guard = SessionGuard::new(self.driver.launch().await?);
        let page = match guard.session_mut() {
            Ok(session) => self.render(session.as_mut(), url).await,
            Err(e) => Err(e),
        };
        guard.release(self.config.render_timeout()).await;

        let extracted = extract_rendered(&page?, url, &self.config);
        info!(
            "🖥️ Rendered extraction of {} produced {} chars and {} tables",
            url,
            extracted.content.len(),
            extracted.tables.len()
        );
        Ok(extracted)
    }
}
