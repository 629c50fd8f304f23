//! Glassdoor: HTTP search results chained by a "next" control

use crate::crawler::extractor::{select_href, select_links, select_text};
use crate::crawler::PageCursor;
use crate::job::{CrawlRequest, JobRecord, Source};
use crate::sources::{join_base, JobPageRules, ListingSite};
use crate::url::encode_query_term;
use crate::{Result, TrawlError};
use scraper::Html;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.glassdoor.com";

const CARD: &str = r#"li[class*="react-job-listing"]"#;
const CARD_LINK: &str = r#"a[class*="jobLink"][href]"#;
// A disabled "next" item marks the last page
const NEXT_PAGE: &str = "li.next:not(.disabled) a[href]";

const TITLE: &str = "div.e1tk4kwz1";
const COMPANY: &str = "div.e1tk4kwz4";
const LOCATION: &str = "div.e1tk4kwz5";
const DESCRIPTION: &str = "#JobDescriptionContainer";

#[derive(Debug, Clone)]
pub struct Glassdoor {
    base_url: String,
}

impl Glassdoor {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn slug(term: &str) -> String {
        encode_query_term(&term.to_lowercase()).replace('+', "-")
    }
}

impl Default for Glassdoor {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl JobPageRules for Glassdoor {
    fn source(&self) -> Source {
        Source::Glassdoor
    }

    fn extract_links(&self, document: &Html, page_url: &Url) -> Vec<Url> {
        select_links(document, Some(CARD), CARD_LINK, page_url)
    }

    fn extract_record(&self, document: &Html, url: &Url) -> Option<JobRecord> {
        JobRecord::new(
            select_text(document, TITLE),
            select_text(document, COMPANY),
            select_text(document, LOCATION),
            select_text(document, DESCRIPTION),
            url.as_str(),
            Source::Glassdoor,
        )
    }
}

impl ListingSite for Glassdoor {
    fn initial_cursor(&self, request: &CrawlRequest) -> Result<PageCursor> {
        let path = format!(
            "/Job/{}-{}-jobs-SRCH_IP1.htm",
            Self::slug(&request.location),
            Self::slug(&request.keyword)
        );
        Ok(PageCursor::Link(join_base(&self.base_url, &path)?))
    }

    fn listing_url(&self, _request: &CrawlRequest, cursor: &PageCursor) -> Result<Url> {
        match cursor {
            PageCursor::Link(url) => Ok(url.clone()),
            other => Err(TrawlError::UnsupportedCursor {
                source_id: Source::Glassdoor.to_string(),
                cursor: format!("{:?}", other),
            }),
        }
    }

    fn next_cursor(
        &self,
        document: &Html,
        page_url: &Url,
        _current: &PageCursor,
    ) -> Option<PageCursor> {
        select_href(document, NEXT_PAGE, page_url).map(PageCursor::Link)
    }
}
