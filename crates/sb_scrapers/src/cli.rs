use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, ValueEnum};
use sb_core::{ContentFetcher, ExtractedContent, ExtractionConfig, Result};
use sb_storage::ResultCache;

use crate::fetchers::{ChromiumDriver, RenderingFetcher, StaticFetcher};
use crate::orchestrator::ContentOrchestrator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FetchStrategy {
    /// Route by URL and fall back on low quality
    Auto,
    /// HTTP only
    Static,
    /// Headless browser only
    Rendered,
}

#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Article URL
    pub url: String,

    #[arg(long, value_enum, default_value_t = FetchStrategy::Auto)]
    pub strategy: FetchStrategy,

    /// Chrome or Chromium binary to launch for rendering
    #[arg(long, env = "SB_CHROME")]
    pub chrome: Option<PathBuf>,

    /// Print the extracted tables after the content
    #[arg(long)]
    pub tables: bool,
}

fn driver(chrome: Option<PathBuf>) -> ChromiumDriver {
    match chrome {
        Some(path) => ChromiumDriver::new().with_executable(path),
        None => ChromiumDriver::new(),
    }
}

pub async fn fetch(args: &FetchArgs, config: ExtractionConfig) -> Result<ExtractedContent> {
    let url = args.url.as_str();
    match args.strategy {
        FetchStrategy::Auto => {
            let orchestrator = ContentOrchestrator::standard(
                config,
                Arc::new(ResultCache::new(1)),
                args.chrome.clone(),
            )?;
            Ok(orchestrator.fetch_content(url).await)
        }
        FetchStrategy::Static => StaticFetcher::new(config)?.fetch(url).await,
        FetchStrategy::Rendered => {
            RenderingFetcher::new(Arc::new(driver(args.chrome.clone())), config)
                .fetch(url)
                .await
        }
    }
}

pub async fn handle_command(args: FetchArgs, config: ExtractionConfig) -> Result<()> {
    let content = fetch(&args, config).await?;
    println!("{}", content.content);
    if args.tables {
        println!("\n📊 {} tables", content.tables.len());
        for table in &content.tables {
            println!("{}", table);
        }
    }
    Ok(())
}
