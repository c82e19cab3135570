//! Strategy selection, fallback and memoization for article content.

use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;

use futures::FutureExt;
use sb_core::{
    ArticleCache, ArticleReference, ArticleResponse, ContentFetcher, Error, ExtractedContent,
    ExtractionConfig, Result,
};
use tokio::task::JoinHandle;

use crate::fetchers::{ChromiumDriver, RenderingFetcher, StaticFetcher};

use crate::filters::is_acceptable_static;
use crate::html::error_content;
use crate::logging::Logger;

/// A panicking fetcher counts as a failed strategy.
async fn fetch_catching_panics(fetcher: &dyn ContentFetcher, url: &str) -> Result<ExtractedContent> {
    match AssertUnwindSafe(fetcher.fetch(url)).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(Error::Browser(format!("{} fetcher panicked: {}", fetcher.name(), detail)))
        }
    }
}

/// Which fetch chain a URL gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// PubMed Central: figures and tables only survive rendering.
    Pmc,
    General,
}

impl Route {
    pub fn for_url(url: &str) -> Self {
        let lowered = url.to_ascii_lowercase();
        let pmc_host = url::Url::parse(&lowered)
            .ok()
            .and_then(|u| u.host_str().map(|h| h == "pmc.ncbi.nlm.nih.gov"))
            .unwrap_or(false);
        if pmc_host || lowered.contains("ncbi.nlm.nih.gov/pmc") {
            Route::Pmc
        } else {
            Route::General
        }
    }
}

/// When a strategy's output is taken as final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    Always,
    /// Only if it passes the static quality rule.
    Quality,
}

#[derive(Clone)]
pub struct Strategy {
    pub fetcher: Arc<dyn ContentFetcher>,
    pub acceptance: Acceptance,
}

pub struct ContentOrchestrator {
    static_fetcher: Arc<dyn ContentFetcher>,
    rendering_fetcher: Arc<dyn ContentFetcher>,
    cache: Arc<dyn ArticleCache>,
    config: ExtractionConfig,
}

impl ContentOrchestrator {
    pub fn new(
        static_fetcher: Arc<dyn ContentFetcher>,
        rendering_fetcher: Arc<dyn ContentFetcher>,
        cache: Arc<dyn ArticleCache>,
        config: ExtractionConfig,
    ) -> Self {
        Self {
            static_fetcher,
            rendering_fetcher,
            cache,
            config,
        }
    }

    /// HTTP fetcher plus a local headless Chromium, optionally at `chrome`.
    pub fn standard(
        config: ExtractionConfig,
        cache: Arc<dyn ArticleCache>,
        chrome: Option<PathBuf>,
    ) -> Result<Self> {
        let mut driver = ChromiumDriver::new();
        if let Some(path) = chrome {
            driver = driver.with_executable(path);
        }
        let static_fetcher = Arc::new(StaticFetcher::new(config.clone())?);
        let rendering_fetcher = Arc::new(RenderingFetcher::new(Arc::new(driver), config.clone()));
        Ok(Self::new(static_fetcher, rendering_fetcher, cache, config))
    }

    pub fn strategies(&self, route: Route) -> Vec<Strategy> {
        let rendered = Strategy {
            fetcher: self.rendering_fetcher.clone(),
            acceptance: Acceptance::Always,
        };
        match route {
            Route::Pmc => vec![rendered],
            Route::General => vec![
                Strategy {
                    fetcher: self.static_fetcher.clone(),
                    acceptance: Acceptance::Quality,
                },
                rendered,
            ],
        }
    }

    fn accepts(&self, acceptance: Acceptance, content: &ExtractedContent) -> bool {
        match acceptance {
            Acceptance::Always => true,
            Acceptance::Quality => {
                is_acceptable_static(&content.content, self.config.min_static_content_len)
            }
        }
    }

    /// Run the fallback chain for `url`. Never fails: if every strategy errors,
    /// the last error is returned as a `<p>` payload.
    pub async fn fetch_content(&self, url: &str) -> ExtractedContent {
        self.fetch_with_logger(url, &Logger::new()).await
    }

    async fn fetch_with_logger(&self, url: &str, logger: &Logger) -> ExtractedContent {
        let route = Route::for_url(url);
        logger.debug(&format!("Routing {} as {:?}", url, route));

        let mut last_error: Option<Error> = None;
        for strategy in self.strategies(route) {
            let logger = logger.clone().with_prefix(format!("[{}]", strategy.fetcher.name()));
            match fetch_catching_panics(strategy.fetcher.as_ref(), url).await {
                Ok(content) if self.accepts(strategy.acceptance, &content) => {
                    logger.info("✅ fetch accepted");
                    return content;
                }
                Ok(_) => {
                    logger.info("🔁 content below quality bar, falling back");
                }
                Err(e) => {
                    logger.warn(&format!("⚠️ fetch failed: {}", e));
                    last_error = Some(e);
                }
            }
        }

        let error = last_error
            .unwrap_or_else(|| Error::Scraping("no strategy produced acceptable content".to_string()));
        logger.error(&format!("❌ no usable content for {}: {}", url, error));
        error_content("Error fetching article", &error)
    }

    /// Cached article content. Error payloads are cached like any other result.
    pub async fn get_article_content(&self, article: &ArticleReference) -> ArticleResponse {
        let logger = Logger::for_article(article.id);
        if let Some(cached) = self.cache.get(article.id).await {
            logger.debug("Cache hit");
            return cached;
        }

        logger.info(&format!("📥 Fetching {}", article.link));
        let content = self.fetch_with_logger(&article.link, &logger).await;
        let response = ArticleResponse::new(article, content);
        self.cache.put(article.id, response.clone()).await;
        response
    }

    /// Run [`Self::get_article_content`] on its own task so the fetch completes
    /// and fills the cache even if the caller stops waiting.
    pub fn spawn_article_content(self: &Arc<Self>, article: ArticleReference) -> JoinHandle<ArticleResponse> {
        let orchestrator = Arc::clone(self);
        tokio::spawn(async move { orchestrator.get_article_content(&article).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sb_storage::ResultCache;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    enum Reply {
        Content(String),
        Fail(&'static str),
        Panic,
    }

    struct CountingFetcher {
        name: &'static str,
        reply: Reply,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl CountingFetcher {
        fn new(name: &'static str, reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ContentFetcher for CountingFetcher {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self, _url: &str) -> Result<ExtractedContent> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match &self.reply {
                Reply::Content(html) => Ok(ExtractedContent::message(html.clone())),
                Reply::Fail(message) => Err(Error::Scraping(message.to_string())),
                Reply::Panic => panic!("{} exploded", self.name),
            }
        }
    }

    fn long_content() -> String {
        format!("<p>{}</p>", "Spaceflight altered bone remodeling. ".repeat(20))
    }

    fn orchestrator(
        static_fetcher: Arc<CountingFetcher>,
        rendering_fetcher: Arc<CountingFetcher>,
    ) -> (ContentOrchestrator, ResultCache) {
        let cache = ResultCache::new(16);
        let orchestrator = ContentOrchestrator::new(
            static_fetcher,
            rendering_fetcher,
            Arc::new(cache.clone()),
            ExtractionConfig::default(),
        );
        (orchestrator, cache)
    }

    fn article(id: usize, link: &str) -> ArticleReference {
        ArticleReference {
            id,
            title: format!("Article {}", id),
            link: link.to_string(),
        }
    }

    #[test]
    fn test_route_for_url() {
        assert_eq!(
            Route::for_url("https://www.ncbi.nlm.nih.gov/pmc/articles/PMC4136787/"),
            Route::Pmc
        );
        assert_eq!(Route::for_url("https://pmc.ncbi.nlm.nih.gov/articles/PMC4136787/"), Route::Pmc);
        assert_eq!(Route::for_url("HTTPS://WWW.NCBI.NLM.NIH.GOV/PMC/articles/PMC1/"), Route::Pmc);
        assert_eq!(Route::for_url("https://www.nature.com/articles/s41526-020-0103-2"), Route::General);
        assert_eq!(Route::for_url("https://pubmed.ncbi.nlm.nih.gov/123/"), Route::General);
    }

    #[test]
    fn test_standard_chains() {
        let orchestrator = ContentOrchestrator::standard(
            ExtractionConfig::default(),
            Arc::new(ResultCache::new(4)),
            None,
        )
        .unwrap();

        let names = |route| {
            orchestrator
                .strategies(route)
                .iter()
                .map(|s| (s.fetcher.name().to_string(), s.acceptance))
                .collect::<Vec<_>>()
        };
        assert_eq!(names(Route::Pmc), vec![("rendered".to_string(), Acceptance::Always)]);
        assert_eq!(
            names(Route::General),
            vec![
                ("static".to_string(), Acceptance::Quality),
                ("rendered".to_string(), Acceptance::Always),
            ]
        );
    }

    #[tokio::test]
    async fn test_pmc_always_renders() {
        let static_fetcher = CountingFetcher::new("static", Reply::Content(long_content()));
        let rendering_fetcher = CountingFetcher::new("rendered", Reply::Content("<p>rendered</p>".into()));
        let (orchestrator, _) = orchestrator(static_fetcher.clone(), rendering_fetcher.clone());

        let content = orchestrator
            .fetch_content("https://www.ncbi.nlm.nih.gov/pmc/articles/PMC3630201/")
            .await;
        assert_eq!(content.content, "<p>rendered</p>");
        assert_eq!(static_fetcher.calls(), 0);
        assert_eq!(rendering_fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_good_static_content_is_accepted() {
        let static_fetcher = CountingFetcher::new("static", Reply::Content(long_content()));
        let rendering_fetcher = CountingFetcher::new("rendered", Reply::Content("<p>rendered</p>".into()));
        let (orchestrator, _) = orchestrator(static_fetcher.clone(), rendering_fetcher.clone());

        let content = orchestrator.fetch_content("https://www.nature.com/articles/x").await;
        assert_eq!(content.content, long_content());
        assert_eq!(static_fetcher.calls(), 1);
        assert_eq!(rendering_fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_low_quality_static_falls_back() {
        let static_fetcher = CountingFetcher::new("static", Reply::Content("<p>too short</p>".into()));
        let rendering_fetcher = CountingFetcher::new("rendered", Reply::Content("<p>rendered</p>".into()));
        let (orchestrator, _) = orchestrator(static_fetcher.clone(), rendering_fetcher.clone());

        let content = orchestrator.fetch_content("https://journals.example.org/a").await;
        assert_eq!(content.content, "<p>rendered</p>");
        assert_eq!(static_fetcher.calls(), 1);
        assert_eq!(rendering_fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_placeholder_static_falls_back() {
        let placeholder = format!(
            "{}{}",
            crate::extract::NOT_EXTRACTED_PLACEHOLDER,
            " ".repeat(600)
        );
        let static_fetcher = CountingFetcher::new("static", Reply::Content(placeholder));
        let rendering_fetcher = CountingFetcher::new("rendered", Reply::Content("<p>rendered</p>".into()));
        let (orchestrator, _) = orchestrator(static_fetcher.clone(), rendering_fetcher.clone());

        let content = orchestrator.fetch_content("https://journals.example.org/b").await;
        assert_eq!(content.content, "<p>rendered</p>");
    }

    #[tokio::test]
    async fn test_all_strategies_fail() {
        let static_fetcher = CountingFetcher::new("static", Reply::Fail("connection reset"));
        let rendering_fetcher = CountingFetcher::new("rendered", Reply::Fail("chrome crashed"));
        let (orchestrator, _) = orchestrator(static_fetcher.clone(), rendering_fetcher.clone());

        let content = orchestrator.fetch_content("https://journals.example.org/c").await;
        assert_eq!(
            content.content,
            "<p>Error fetching article: Scraping error: chrome crashed</p>"
        );
        assert!(content.tables.is_empty());
        assert_eq!(static_fetcher.calls(), 1);
        assert_eq!(rendering_fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_second_request_is_served_from_cache() {
        let static_fetcher = CountingFetcher::new("static", Reply::Content(long_content()));
        let rendering_fetcher = CountingFetcher::new("rendered", Reply::Content("<p>rendered</p>".into()));
        let (orchestrator, cache) = orchestrator(static_fetcher.clone(), rendering_fetcher.clone());
        let reference = article(7, "https://www.ncbi.nlm.nih.gov/pmc/articles/PMC7/");

        let first = orchestrator.get_article_content(&reference).await;
        let second = orchestrator.get_article_content(&reference).await;
        assert_eq!(first, second);
        assert_eq!(second.id, 7);
        assert_eq!(second.title, "Article 7");
        assert_eq!(rendering_fetcher.calls(), 1);
        assert_eq!(static_fetcher.calls(), 0);
        assert!(cache.contains(7).await);
    }

    #[tokio::test]
    async fn test_error_content_is_cached() {
        let static_fetcher = CountingFetcher::new("static", Reply::Fail("boom"));
        let rendering_fetcher = CountingFetcher::new("rendered", Reply::Fail("boom"));
        let (orchestrator, _) = orchestrator(static_fetcher.clone(), rendering_fetcher.clone());
        let reference = article(1, "https://example.org/a");

        let first = orchestrator.get_article_content(&reference).await;
        assert!(first.content.starts_with("<p>Error fetching article"));
        orchestrator.get_article_content(&reference).await;
        assert_eq!(rendering_fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_panicking_fetcher_falls_through() {
        let static_fetcher = CountingFetcher::new("static", Reply::Panic);
        let rendering_fetcher = CountingFetcher::new("rendered", Reply::Content("<p>rendered</p>".into()));
        let (orchestrator, _) = orchestrator(static_fetcher.clone(), rendering_fetcher.clone());

        let content = orchestrator.fetch_content("https://example.org/article").await;
        assert_eq!(content.content, "<p>rendered</p>");
        assert_eq!(static_fetcher.calls(), 1);
        assert_eq!(rendering_fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_panicking_renderer_yields_cached_error_content() {
        let static_fetcher = CountingFetcher::new("static", Reply::Content(long_content()));
        let rendering_fetcher = CountingFetcher::new("rendered", Reply::Panic);
        let (orchestrator, cache) = orchestrator(static_fetcher, rendering_fetcher);
        let orchestrator = Arc::new(orchestrator);

        let reference = article(9, "https://www.ncbi.nlm.nih.gov/pmc/articles/PMC9/");
        let response = orchestrator.spawn_article_content(reference).await.unwrap();
        assert_eq!(
            response.content,
            "<p>Error fetching article: Browser error: rendered fetcher panicked: rendered exploded</p>"
        );
        assert_eq!(cache.get(9).await.unwrap().content, response.content);
    }

    #[tokio::test]
    async fn test_abandoned_request_still_fills_cache() {
        let static_fetcher = CountingFetcher::new("static", Reply::Content(long_content()));
        let rendering_fetcher = Arc::new(CountingFetcher {
            name: "rendered",
            reply: Reply::Content("<p>slow render</p>".into()),
            delay: Duration::from_millis(50),
            calls: AtomicUsize::new(0),
        });
        let (orchestrator, cache) = orchestrator(static_fetcher, rendering_fetcher);
        let orchestrator = Arc::new(orchestrator);

        let reference = article(3, "https://www.ncbi.nlm.nih.gov/pmc/articles/PMC3/");
        let handle = orchestrator.spawn_article_content(reference);
        // the caller gives up without awaiting the fetch
        let waited = tokio::time::timeout(Duration::from_millis(5), async { handle.await }).await;
        assert!(waited.is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        let cached = cache.get(3).await.unwrap();
        assert_eq!(cached.content, "<p>slow render</p>");
    }
}
