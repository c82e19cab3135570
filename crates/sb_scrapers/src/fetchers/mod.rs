pub mod chromium;
pub mod rendered;
pub mod static_fetcher;

pub use chromium::ChromiumDriver;
pub use rendered::{BrowserDriver, BrowserSession, RenderingFetcher, SessionGuard};
pub use static_fetcher::StaticFetcher;
