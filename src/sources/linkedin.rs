//! LinkedIn: infinite-scroll search results rendered in a browser

use crate::crawler::extractor::{select_links, select_text, select_text_within};
use crate::job::{CrawlRequest, JobRecord, Source};
use crate::sources::{join_base, JobPageRules, ScrollSite};
use crate::Result;
use scraper::Html;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.linkedin.com";

const RESULTS: &str = "ul.jobs-search__results-list";
const SHOW_MORE: &str = "button.infinite-scroller__show-more-button";
const CARD_LINK: &str = "a.base-card__full-link[href]";

const TITLE: &str = "h1.top-card-layout__title";
const FLAVOR_ROW: &str = "div.topcard__flavor-row";
const COMPANY: &str = "a.topcard__org-name-link";
const LOCATION: &str = "span.topcard__flavor--bullet";
const DESCRIPTION: &str = "div.description__text";

#[derive(Debug, Clone)]
pub struct LinkedIn {
    base_url: String,
}

impl LinkedIn {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for LinkedIn {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl JobPageRules for LinkedIn {
    fn source(&self) -> Source {
        Source::LinkedIn
    }

    fn extract_links(&self, document: &Html, page_url: &Url) -> Vec<Url> {
        select_links(document, None, CARD_LINK, page_url)
    }

    fn extract_record(&self, document: &Html, url: &Url) -> Option<JobRecord> {
        JobRecord::new(
            select_text(document, TITLE),
            select_text_within(document, FLAVOR_ROW, COMPANY),
            select_text_within(document, FLAVOR_ROW, LOCATION),
            select_text(document, DESCRIPTION),
            url.as_str(),
            Source::LinkedIn,
        )
    }
}

impl ScrollSite for LinkedIn {
    fn search_url(&self, request: &CrawlRequest) -> Result<Url> {
        let mut url = join_base(&self.base_url, "/jobs/search")?;
        url.query_pairs_mut()
            .append_pair("keywords", request.keyword.trim())
            .append_pair("location", request.location.trim());
        Ok(url)
    }

    fn results_selector(&self) -> &str {
        RESULTS
    }

    fn show_more_selector(&self) -> &str {
        SHOW_MORE
    }
}
