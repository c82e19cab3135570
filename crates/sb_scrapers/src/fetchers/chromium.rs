use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetScriptExecutionDisabledParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use sb_core::{Error, Result};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::rendered::{BrowserDriver, BrowserSession};

/// Flags for a lean headless Chromium: no sandbox, no GPU, no images.
pub const DEFAULT_BROWSER_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--blink-settings=imagesEnabled=false",
];

const BODY_POLL_INTERVAL: Duration = Duration::from_millis(100);

fn cdp(e: CdpError) -> Error {
    Error::Browser(e.to_string())
}

/// Launches a local headless Chromium per session.
#[derive(Debug, Clone)]
pub struct ChromiumDriver {
    args: Vec<String>,
    executable: Option<PathBuf>,
    disable_scripts: bool,
}

impl Default for ChromiumDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ChromiumDriver {
    pub fn new() -> Self {
        Self {
            args: DEFAULT_BROWSER_ARGS.iter().map(|a| a.to_string()).collect(),
            executable: None,
            disable_scripts: true,
        }
    }

    /// Use a specific Chrome/Chromium binary instead of auto-detection.
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    pub fn with_scripts_enabled(mut self) -> Self {
        self.disable_scripts = false;
        self
    }
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        let mut builder = BrowserConfig::builder()
            .args(self.args.clone())
            .window_size(1920, 1080);
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(Error::Browser)?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(cdp)?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        info!("🌐 Launched headless browser");

        Ok(Box::new(ChromiumSession {
            browser: Some(browser),
            handler: Some(handler),
            page: None,
            disable_scripts: self.disable_scripts,
        }))
    }
}

struct ChromiumSession {
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
    page: Option<Page>,
    disable_scripts: bool,
}

impl ChromiumSession {
    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| Error::Browser("no page open".to_string()))
    }

    fn stop_handler(&mut self) {
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| Error::Browser("browser already closed".to_string()))?;
        let page = browser.new_page("about:blank").await.map_err(cdp)?;
        if self.disable_scripts {
            page.execute(SetScriptExecutionDisabledParams::new(true))
                .await
                .map_err(cdp)?;
        }
        page.goto(url).await.map_err(cdp)?;
        self.page = Some(page);
        Ok(())
    }

    async fn wait_for_body(&mut self) -> Result<()> {
        let page = self.page()?;
        loop {
            if page.find_element("body").await.is_ok() {
                return Ok(());
            }
            tokio::time::sleep(BODY_POLL_INTERVAL).await;
        }
    }

    async fn evaluate(&mut self, script: &str) -> Result<()> {
        self.page()?.evaluate(script).await.map_err(cdp)?;
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String> {
        self.page()?.content().await.map_err(cdp)
    }

    async fn close(&mut self) -> Result<()> {
        self.page = None;
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                self.browser = Some(browser);
                return Err(cdp(e));
            }
            browser.wait().await?;
        }
        self.stop_handler();
        debug!("Browser closed");
        Ok(())
    }

    fn abort(&mut self) {
        self.page = None;
        if let Some(mut browser) = self.browser.take() {
            match tokio::runtime::Handle::try_current() {
                Ok(runtime) => {
                    runtime.spawn(async move {
                        let _ = browser.kill().await;
                    });
                }
                Err(_) => drop(browser),
            }
        }
        self.stop_handler();
    }
}
