//! Crawl engine
//!
//! This module contains the source-independent crawling logic:
//! - HTTP fetching and the browser-session contract
//! - Pagination and per-source pacing
//! - The two source-adapter engines
//! - Cross-source orchestration

mod adapter;
mod browser;
pub mod extractor;
mod fetcher;
mod orchestrator;
mod pacing;
mod paginator;
#[cfg(feature = "webdriver")]
mod webdriver;

pub use adapter::{KeywordCrawl, PagedHttpAdapter, ScrollAdapter, SourceAdapter};
pub use browser::{BrowserLauncher, BrowserSession};
pub use fetcher::{build_http_client, Document, HttpFetcher};
pub use orchestrator::{CrawlOutcome, CrawlPlan, Orchestrator, RunStatus, SourceReport};
pub use pacing::PacingPolicy;
pub use paginator::{PageCursor, PageOutcome, Paginator, PaginatorState, StopReason};
#[cfg(feature = "webdriver")]
pub use webdriver::WebDriverLauncher;

use crate::config::Config;
use crate::job::Source;
use crate::sources::{Glassdoor, Indeed, LinkedIn};
use crate::{Result, TrawlError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Builds the orchestrator and one adapter per configured source
///
/// A source whose adapter cannot be built is registered as failed, so the
/// run still reports it.
pub fn build_orchestrator(config: &Config, cancel: CancellationToken) -> Result<Orchestrator> {
    let scraping = &config.scraping;
    let pacing = Arc::new(PacingPolicy::new(scraping.request_delay()));
    let fetcher = HttpFetcher::new(&scraping.user_agent, scraping.request_timeout())?;
    let max_pages = scraping.max_pages_per_keyword;

    let mut orchestrator = Orchestrator::new(scraping.max_concurrent_sources, cancel);

    for source in config.sources()? {
        let adapter: Arc<dyn SourceAdapter> = match source {
            Source::Indeed => Arc::new(PagedHttpAdapter::new(
                Indeed::default(),
                fetcher.clone(),
                Arc::clone(&pacing),
                max_pages,
            )),
            Source::Glassdoor => Arc::new(PagedHttpAdapter::new(
                Glassdoor::default(),
                fetcher.clone(),
                Arc::clone(&pacing),
                max_pages,
            )),
            Source::LinkedIn => {
                let launcher = match browser_launcher(config) {
                    Ok(launcher) => launcher,
                    Err(e) => {
                        orchestrator.register_failed(source, e);
                        continue;
                    }
                };
                Arc::new(
                    ScrollAdapter::new(
                        LinkedIn::default(),
                        launcher,
                        fetcher.clone(),
                        Arc::clone(&pacing),
                    )
                    .with_max_pages(max_pages)
                    .with_render_timeout(scraping.render_timeout())
                    .with_user_agent(scraping.user_agent.clone()),
                )
            }
        };
        orchestrator.register(adapter);
    }

    Ok(orchestrator)
}

/// The browser backend for rendered sources
///
/// Fails if no WebDriver endpoint is configured or the binary was built
/// without WebDriver support.
fn browser_launcher(config: &Config) -> Result<Arc<dyn BrowserLauncher>> {
    match &config.scraping.webdriver_url {
        Some(endpoint) => webdriver_launcher(endpoint),
        None => Err(browser_unavailable("no webdriver-url configured")),
    }
}

#[cfg(feature = "webdriver")]
fn webdriver_launcher(endpoint: &str) -> Result<Arc<dyn BrowserLauncher>> {
    Ok(Arc::new(WebDriverLauncher::new(endpoint)?))
}

#[cfg(not(feature = "webdriver"))]
fn webdriver_launcher(endpoint: &str) -> Result<Arc<dyn BrowserLauncher>> {
    tracing::debug!("Ignoring webdriver-url {}", endpoint);
    Err(browser_unavailable("built without the webdriver feature"))
}

fn browser_unavailable(message: &str) -> TrawlError {
    TrawlError::SessionUnavailable {
        source_id: Source::LinkedIn.to_string(),
        message: message.to_string(),
    }
}
