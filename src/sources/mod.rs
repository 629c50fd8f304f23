//! Site-specific rules
//!
//! Each listing site is one module. A site describes how to build its search
//! URLs, where job links sit on a listing page, how its "more results" signal
//! looks, and where the record fields sit on a job page. The shared crawl
//! engine in [`crate::crawler`] does the rest.

mod glassdoor;
mod indeed;
mod linkedin;

pub use glassdoor::Glassdoor;
pub use indeed::Indeed;
pub use linkedin::LinkedIn;

use crate::crawler::PageCursor;
use crate::job::{CrawlRequest, JobRecord, Source};
use crate::Result;
use scraper::Html;
use url::Url;

/// Field-location rules for one site
pub trait JobPageRules: Send + Sync {
    fn source(&self) -> Source;

    /// Job links on a listing page, canonical, in document order, unique
    fn extract_links(&self, document: &Html, page_url: &Url) -> Vec<Url>;

    /// The record on a job page, or None if a required field is missing
    fn extract_record(&self, document: &Html, url: &Url) -> Option<JobRecord>;
}

/// A site whose listing is a sequence of HTTP pages
pub trait ListingSite: JobPageRules {
    /// Cursor of the first results page for `request`
    fn initial_cursor(&self, request: &CrawlRequest) -> Result<PageCursor>;

    /// URL of the results page at `cursor`
    fn listing_url(&self, request: &CrawlRequest, cursor: &PageCursor) -> Result<Url>;

    /// The "more results" signal: the cursor after `current`, if the page
    /// advertises one
    fn next_cursor(&self, document: &Html, page_url: &Url, current: &PageCursor)
        -> Option<PageCursor>;
}

/// A site whose listing grows in place as the page is scrolled
pub trait ScrollSite: JobPageRules {
    fn search_url(&self, request: &CrawlRequest) -> Result<Url>;

    /// Element whose presence means the results have rendered
    fn results_selector(&self) -> &str;

    /// Control that loads more results once scrolling stops doing so
    fn show_more_selector(&self) -> &str;
}

/// Extraction rules for `source` with the site's default base URL
pub fn rules_for(source: Source) -> Box<dyn JobPageRules> {
    match source {
        Source::Indeed => Box::new(Indeed::default()),
        Source::Glassdoor => Box::new(Glassdoor::default()),
        Source::LinkedIn => Box::new(LinkedIn::default()),
    }
}

/// Joins a base URL and an absolute path, tolerating a trailing slash on the
/// base
pub(crate) fn join_base(base: &str, path: &str) -> Result<Url> {
    Ok(Url::parse(&format!("{}{}", base.trim_end_matches('/'), path))?)
}
