pub mod cli;
pub mod extract;
pub mod fetchers;
pub mod filters;
pub mod html;
pub mod logging;
pub mod orchestrator;

pub use cli::{handle_command, FetchArgs, FetchStrategy};
pub use fetchers::{BrowserDriver, BrowserSession, ChromiumDriver, RenderingFetcher, StaticFetcher};
pub use logging::{init_logging, Logger};
pub use orchestrator::{ContentOrchestrator, Route};

pub mod prelude {
    pub use super::orchestrator::ContentOrchestrator;
    pub use sb_core::{ArticleReference, ArticleResponse, ContentFetcher, Error, ExtractedContent, Result};
}
