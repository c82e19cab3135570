use anyhow::Context;
use clap::Parser;
use sb_core::{ExtractionConfig, TextGenerator};
use sb_inference::{create_model, ArticleAnalyzer};
use sb_scrapers::{init_logging, ContentOrchestrator, FetchArgs};
use sb_storage::{ArticleCatalog, ResultCache};
use sb_web::{create_app, AppState, OsdrClient};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "NASA space biology article service", long_about = None)]
pub struct Cli {
    /// Publication list with `Title` and `Link` columns
    #[arg(long, env = "SB_CATALOG", default_value = "SB_publication_PMC.csv")]
    catalog: PathBuf,
    /// JSON file overriding extraction thresholds and timings
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, help = "Model to use for text generation. Available models: gemini, dummy. Defaults to gemini when an API key is set")]
    model: Option<String>,
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Provider model id, e.g. gemini-2.5-flash
    #[arg(long)]
    model_id: Option<String>,
    #[arg(long, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8000)]
        port: u16,
        /// Chrome or Chromium binary to launch for rendering
        #[arg(long, env = "SB_CHROME")]
        chrome: Option<PathBuf>,
        /// Maximum number of cached article responses
        #[arg(long)]
        cache_capacity: Option<usize>,
    },
    /// Fetch one article and print the extracted HTML
    Fetch(FetchArgs),
    /// Print chart data, keywords, metadata and a summary for an article file
    Analyze {
        file: PathBuf,
        #[arg(long, default_value = "")]
        title: String,
    },
    /// List the catalog
    List,
}

impl Cli {
    fn inference_config(&self) -> sb_inference::Config {
        sb_inference::Config {
            model_name: self.model.clone(),
            api_key: self.api_key.clone(),
            model_id: self.model_id.clone(),
            base_url: None,
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ExtractionConfig> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
        }
        None => Ok(ExtractionConfig::default()),
    }
}

async fn serve(
    cli: &Cli,
    config: ExtractionConfig,
    addr: String,
    chrome: Option<PathBuf>,
) -> anyhow::Result<()> {
    let catalog = ArticleCatalog::load_or_empty(&cli.catalog);

    let cache = Arc::new(ResultCache::new(config.cache_capacity));
    let orchestrator = ContentOrchestrator::standard(config, cache, chrome)?;
    let model = create_model(&cli.inference_config())?;
    info!("🧠 Text generation initialized (using {})", model.name());

    let state = AppState::new(catalog, orchestrator, model, OsdrClient::new()?);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("🚀 Listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn analyze(cli: &Cli, file: &Path, title: &str) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let analyzer = ArticleAnalyzer::new(create_model(&cli.inference_config())?);
    info!("🔬 Analyzing {} with {}", file.display(), analyzer.model_name());
    let summary = analyzer.comprehensive_summary(title, &content).await;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn list(cli: &Cli) -> anyhow::Result<()> {
    let catalog = ArticleCatalog::from_path(&cli.catalog)?;
    for article in catalog.articles() {
        println!("{:>5}  {}  {}", article.id, article.title, article.link);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    let mut config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Serve {
            host,
            port,
            chrome,
            cache_capacity,
        } => {
            if let Some(capacity) = cache_capacity {
                config.cache_capacity = *capacity;
            }
            serve(&cli, config, format!("{}:{}", host, port), chrome.clone()).await?;
        }
        Commands::Fetch(args) => {
            info!("🦗 Fetching single URL: {}", args.url);
            sb_scrapers::handle_command(args.clone(), config).await?;
        }
        Commands::Analyze { file, title } => analyze(&cli, file, title).await?,
        Commands::List => list(&cli)?,
    }
    Ok(())
}
