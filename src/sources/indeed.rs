//! Indeed: offset-paged search results over plain HTTP

use crate::crawler::extractor::{has_element, select_last_text_within, select_links, select_text};
use crate::crawler::PageCursor;
use crate::job::{CrawlRequest, JobRecord, Source};
use crate::sources::{join_base, JobPageRules, ListingSite};
use crate::{Result, TrawlError};
use scraper::Html;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.indeed.com";

/// Results per search page; the `start` parameter advances by this much
pub const PAGE_SIZE: u32 = 10;

const CARD: &str = r#"div[class*="job_seen_beacon"]"#;
const CARD_LINK: &str = r#"a[class*="jcs-JobTitle"][href]"#;
const NEXT_PAGE: &str = r#"a[aria-label="Next Page"]"#;

const TITLE: &str = r#"h1[class*="jobsearch-JobInfoHeader-title"]"#;
const COMPANY: &str = r#"[data-testid="inlineHeader-companyName"]"#;
const SUBTITLE: &str = r#"[data-testid="jobsearch-JobInfoHeader-subtitle"]"#;
const DESCRIPTION: &str = "#jobDescriptionText";

#[derive(Debug, Clone)]
pub struct Indeed {
    base_url: String,
}

impl Indeed {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for Indeed {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl JobPageRules for Indeed {
    fn source(&self) -> Source {
        Source::Indeed
    }

    fn extract_links(&self, document: &Html, page_url: &Url) -> Vec<Url> {
        select_links(document, Some(CARD), CARD_LINK, page_url)
    }

    fn extract_record(&self, document: &Html, url: &Url) -> Option<JobRecord> {
        JobRecord::new(
            select_text(document, TITLE),
            select_text(document, COMPANY),
            select_last_text_within(document, SUBTITLE, "div"),
            select_text(document, DESCRIPTION),
            url.as_str(),
            Source::Indeed,
        )
    }
}

impl ListingSite for Indeed {
    fn initial_cursor(&self, _request: &CrawlRequest) -> Result<PageCursor> {
        Ok(PageCursor::Offset(0))
    }

    fn listing_url(&self, request: &CrawlRequest, cursor: &PageCursor) -> Result<Url> {
        let PageCursor::Offset(start) = cursor else {
            return Err(TrawlError::UnsupportedCursor {
                source_id: Source::Indeed.to_string(),
                cursor: format!("{:?}", cursor),
            });
        };

        let mut url = join_base(&self.base_url, "/jobs")?;
        url.query_pairs_mut()
            .append_pair("q", request.keyword.trim())
            .append_pair("l", request.location.trim())
            .append_pair("start", &start.to_string());
        Ok(url)
    }

    fn next_cursor(
        &self,
        document: &Html,
        _page_url: &Url,
        current: &PageCursor,
    ) -> Option<PageCursor> {
        match current {
            PageCursor::Offset(start) if has_element(document, NEXT_PAGE) => {
                Some(PageCursor::Offset(start + PAGE_SIZE))
            }
            _ => None,
        }
    }
}
