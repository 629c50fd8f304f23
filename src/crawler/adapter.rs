//! Source adapters
//!
//! An adapter binds the fetcher, the extractor rules of one site and a fresh
//! paginator into a single `crawl` call. Two engines cover every site:
//!
//! - [`PagedHttpAdapter`] walks HTTP listing pages (offset or next-link)
//! - [`ScrollAdapter`] scrolls a rendered listing in one browser session
//!
//! Both fetch the individual job pages over HTTP and both consult the shared
//! [`PacingPolicy`] before every request.

use crate::crawler::browser::{BrowserLauncher, BrowserSession};
use crate::crawler::fetcher::{Document, HttpFetcher};
use crate::crawler::pacing::PacingPolicy;
use crate::crawler::paginator::{PageCursor, PageOutcome, Paginator, StopReason};
use crate::job::{CrawlRequest, JobRecord, Limit, Source};
use crate::sources::{JobPageRules, ListingSite, ScrollSite};
use crate::{FetchFailure, Result, TrawlError};
use async_trait::async_trait;
use scraper::Html;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// The crawl capability shared by every source
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source(&self) -> Source;

    /// Collects up to `request.limit` records for one keyword
    ///
    /// Page-level and job-level failures are handled inside and only shorten
    /// the result; a failed listing shows up in [`KeywordCrawl::stop`]. An
    /// `Err` means the adapter could not run at all.
    async fn crawl(
        &self,
        request: &CrawlRequest,
        cancel: &CancellationToken,
    ) -> Result<KeywordCrawl>;
}

/// What one keyword crawl on one source produced
#[derive(Debug)]
pub struct KeywordCrawl {
    pub records: Vec<JobRecord>,

    /// Why the listing stopped
    pub stop: StopReason,
}

impl KeywordCrawl {
    pub fn new(records: Vec<JobRecord>, stop: StopReason) -> Self {
        Self { records, stop }
    }

    /// True if the listing could not be fetched or rendered
    pub fn listing_failed(&self) -> bool {
        self.stop == StopReason::PageFailed
    }
}

/// Records and seen links of one crawl invocation
#[derive(Debug, Default)]
struct CrawlProgress {
    seen: HashSet<Url>,
    records: Vec<JobRecord>,
}

impl CrawlProgress {
    fn count_new(&self, links: &[Url]) -> usize {
        links.iter().filter(|link| !self.seen.contains(*link)).count()
    }
}

/// Paced HTTP access to one source's job pages
#[derive(Debug, Clone)]
struct JobPageFetcher {
    source: Source,
    fetcher: HttpFetcher,
    pacing: Arc<PacingPolicy>,
}

impl JobPageFetcher {
    /// Waits for the source's pacing turn, then fetches `url`
    ///
    /// Returns None if the crawl was cancelled first.
    async fn fetch(
        &self,
        url: &Url,
        cancel: &CancellationToken,
    ) -> Option<std::result::Result<Document, FetchFailure>> {
        if !self.pacing.wait_turn(self.source, cancel).await {
            return None;
        }
        Some(self.fetcher.fetch(url).await)
    }

    /// Fetches and extracts every link not yet seen, in order, until the
    /// limit is reached
    async fn collect<R: JobPageRules + ?Sized>(
        &self,
        rules: &R,
        links: &[Url],
        limit: Limit,
        progress: &mut CrawlProgress,
        cancel: &CancellationToken,
    ) {
        for link in links {
            if limit.is_reached(progress.records.len()) || cancel.is_cancelled() {
                return;
            }
            if !progress.seen.insert(link.clone()) {
                continue;
            }

            let page = match self.fetch(link, cancel).await {
                None => return,
                Some(Ok(page)) => page,
                Some(Err(failure)) => {
                    tracing::debug!("Skipping {}: {}", link, failure);
                    continue;
                }
            };

            let record = {
                let document = Html::parse_document(&page.body);
                rules.extract_record(&document, link)
            };

            match record {
                Some(record) => progress.records.push(record),
                None => tracing::debug!(
                    "Skipping {}: {}",
                    link,
                    TrawlError::ExtractionMiss {
                        url: link.to_string()
                    }
                ),
            }
        }
    }
}

/// Engine for sites whose listing is a sequence of HTTP pages
pub struct PagedHttpAdapter<S> {
    site: S,
    pages: JobPageFetcher,
    max_pages: u32,
}

impl<S: ListingSite> PagedHttpAdapter<S> {
    pub fn new(site: S, fetcher: HttpFetcher, pacing: Arc<PacingPolicy>, max_pages: u32) -> Self {
        let source = site.source();
        Self {
            site,
            pages: JobPageFetcher {
                source,
                fetcher,
                pacing,
            },
            max_pages,
        }
    }
}

#[async_trait]
impl<S: ListingSite> SourceAdapter for PagedHttpAdapter<S> {
    fn source(&self) -> Source {
        self.site.source()
    }

    async fn crawl(
        &self,
        request: &CrawlRequest,
        cancel: &CancellationToken,
    ) -> Result<KeywordCrawl> {
        let source = self.site.source();
        let mut paginator = Paginator::new(request.limit, self.max_pages);
        let mut progress = CrawlProgress::default();
        let mut cursor = paginator.start(self.site.initial_cursor(request)?).cloned();

        while let Some(current) = cursor {
            let listing_url = self.site.listing_url(request, &current)?;

            let page = match self.pages.fetch(&listing_url, cancel).await {
                None => {
                    paginator.exhaust(StopReason::Cancelled);
                    break;
                }
                Some(Ok(page)) => page,
                Some(Err(failure)) => {
                    tracing::warn!(
                        "{}",
                        TrawlError::Fetch {
                            url: listing_url.to_string(),
                            failure
                        }
                    );
                    paginator.exhaust(StopReason::PageFailed);
                    break;
                }
            };

            let (links, next) = {
                let document = Html::parse_document(&page.body);
                (
                    self.site.extract_links(&document, &page.final_url),
                    self.site.next_cursor(&document, &page.final_url, &current),
                )
            };

            if links.is_empty() {
                tracing::warn!(
                    "{}",
                    TrawlError::PageEmpty {
                        url: listing_url.to_string()
                    }
                );
            }

            let new_links = progress.count_new(&links);
            self.pages
                .collect(&self.site, &links, request.limit, &mut progress, cancel)
                .await;

            if cancel.is_cancelled() {
                paginator.exhaust(StopReason::Cancelled);
                break;
            }

            cursor = paginator
                .advance(PageOutcome {
                    links_found: links.len(),
                    new_links,
                    next,
                    collected: progress.records.len(),
                })
                .cloned();
        }

        let stop = paginator.stop_reason().unwrap_or(StopReason::NoMoreResults);
        tracing::info!(
            "{} '{}': {} records from {} listing pages ({})",
            source,
            request.keyword,
            progress.records.len(),
            paginator.pages_issued(),
            stop
        );

        Ok(KeywordCrawl::new(progress.records, stop))
    }
}

/// Engine for sites that load more results as a rendered page is scrolled
///
/// The listing lives in one browser session for the whole crawl. Job pages
/// are fetched over HTTP so navigating to them never discards the scroll
/// position.
pub struct ScrollAdapter<S> {
    site: S,
    launcher: Arc<dyn BrowserLauncher>,
    pages: JobPageFetcher,
    max_pages: u32,
    render_timeout: Duration,
    user_agent: String,
}

impl<S: ScrollSite> ScrollAdapter<S> {
    pub fn new(
        site: S,
        launcher: Arc<dyn BrowserLauncher>,
        fetcher: HttpFetcher,
        pacing: Arc<PacingPolicy>,
    ) -> Self {
        let source = site.source();
        Self {
            site,
            launcher,
            pages: JobPageFetcher {
                source,
                fetcher,
                pacing,
            },
            max_pages: 50,
            render_timeout: Duration::from_secs(20),
            user_agent: String::new(),
        }
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_render_timeout(mut self, render_timeout: Duration) -> Self {
        self.render_timeout = render_timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    async fn crawl_in_session(
        &self,
        session: &mut dyn BrowserSession,
        search_url: &Url,
        request: &CrawlRequest,
        cancel: &CancellationToken,
    ) -> Result<KeywordCrawl> {
        let source = self.site.source();
        let pacing = &self.pages.pacing;

        if !pacing.wait_turn(source, cancel).await {
            return Ok(KeywordCrawl::new(Vec::new(), StopReason::Cancelled));
        }
        session.open(search_url.as_str()).await?;

        let results = self.site.results_selector();
        if !session.wait_for_element(results, self.render_timeout).await? {
            tracing::warn!(
                "{}",
                TrawlError::Fetch {
                    url: search_url.to_string(),
                    failure: FetchFailure::Timeout(results.to_string()),
                }
            );
            return Ok(KeywordCrawl::new(Vec::new(), StopReason::PageFailed));
        }

        let mut paginator = Paginator::new(request.limit, self.max_pages);
        let mut progress = CrawlProgress::default();
        let height = session.current_scrollable_height().await?;
        let mut cursor = paginator
            .start(PageCursor::Scroll { step: 0, height })
            .cloned();

        while let Some(PageCursor::Scroll { step, height }) = cursor {
            let body = session.page_text().await?;
            let links = {
                let document = Html::parse_document(&body);
                self.site.extract_links(&document, search_url)
            };

            if links.is_empty() {
                tracing::warn!(
                    "{}",
                    TrawlError::PageEmpty {
                        url: search_url.to_string()
                    }
                );
            }

            let new_links = progress.count_new(&links);
            self.pages
                .collect(&self.site, &links, request.limit, &mut progress, cancel)
                .await;

            let wants_more = !links.is_empty()
                && new_links > 0
                && !request.limit.is_reached(progress.records.len());
            let next = if wants_more {
                self.load_more(session, height, cancel)
                    .await?
                    .map(|height| PageCursor::Scroll {
                        step: step + 1,
                        height,
                    })
            } else {
                None
            };

            if cancel.is_cancelled() {
                paginator.exhaust(StopReason::Cancelled);
                break;
            }

            cursor = paginator
                .advance(PageOutcome {
                    links_found: links.len(),
                    new_links,
                    next,
                    collected: progress.records.len(),
                })
                .cloned();
        }

        let stop = paginator.stop_reason().unwrap_or(StopReason::NoMoreResults);
        tracing::info!(
            "{} '{}': {} records after {} scroll steps ({})",
            source,
            request.keyword,
            progress.records.len(),
            paginator.pages_issued(),
            stop
        );

        Ok(KeywordCrawl::new(progress.records, stop))
    }

    /// Tries to grow the listing: scroll, scroll again, then the show-more
    /// control
    ///
    /// Returns the new height, or None if nothing grew the page.
    async fn load_more(
        &self,
        session: &mut dyn BrowserSession,
        previous_height: u64,
        cancel: &CancellationToken,
    ) -> Result<Option<u64>> {
        let pacing = &self.pages.pacing;

        for _ in 0..2 {
            session.scroll_to_bottom().await?;
            if !pacing.settle(cancel).await {
                return Ok(None);
            }
            let height = session.current_scrollable_height().await?;
            if height > previous_height {
                return Ok(Some(height));
            }
        }

        if !session
            .click_if_visible(self.site.show_more_selector())
            .await?
        {
            return Ok(None);
        }
        if !pacing.settle(cancel).await {
            return Ok(None);
        }

        let height = session.current_scrollable_height().await?;
        Ok((height > previous_height).then_some(height))
    }
}

#[async_trait]
impl<S: ScrollSite> SourceAdapter for ScrollAdapter<S> {
    fn source(&self) -> Source {
        self.site.source()
    }

    async fn crawl(
        &self,
        request: &CrawlRequest,
        cancel: &CancellationToken,
    ) -> Result<KeywordCrawl> {
        let source = self.site.source();
        let search_url = self.site.search_url(request)?;

        let session = self.launcher.launch(&self.user_agent).await.map_err(|e| {
            TrawlError::SessionUnavailable {
                source_id: source.to_string(),
                message: e.to_string(),
            }
        })?;
        let mut guard = SessionGuard::new(source, session);

        let result = match guard.session_mut() {
            Ok(session) => {
                self.crawl_in_session(session, &search_url, request, cancel)
                    .await
            }
            Err(e) => Err(e),
        };

        guard.close().await;
        result
    }
}

/// Owns a browser session until it is closed
///
/// A session still held when the guard drops (the crawl panicked or its
/// future was dropped) is closed on a background task.
struct SessionGuard {
    source: Source,
    session: Option<Box<dyn BrowserSession>>,
}

impl SessionGuard {
    fn new(source: Source, session: Box<dyn BrowserSession>) -> Self {
        Self {
            source,
            session: Some(session),
        }
    }

    fn session_mut(&mut self) -> Result<&mut (dyn BrowserSession + 'static)> {
        match self.session.as_deref_mut() {
            Some(session) => Ok(session),
            None => Err(TrawlError::Browser(format!(
                "{} browser session already closed",
                self.source
            ))),
        }
    }

    async fn close(mut self) {
        if let Some(session) = self.session.take() {
            close_session(self.source, session).await;
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let source = self.source;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(close_session(source, session));
            }
            Err(_) => tracing::warn!("{} browser session dropped outside a runtime", source),
        }
    }
}

async fn close_session(source: Source, session: Box<dyn BrowserSession>) {
    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close {} browser session: {}", source, e);
    }
}
