//! HTML field extraction
//!
//! Site adapters describe *where* things are with CSS selectors; the helpers
//! here do the locating. All text goes through whitespace collapsing and an
//! element whose text collapses to nothing counts as missing.

use crate::job::{collapse_whitespace, JobRecord, Source};
use crate::sources::rules_for;
use crate::url::resolve_href;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts the job links from a listing page of `source`
///
/// Links come back canonicalized, in document order, without duplicates.
pub fn extract_links(document: &str, page_url: &Url, source: Source) -> Vec<Url> {
    let document = Html::parse_document(document);
    rules_for(source).extract_links(&document, page_url)
}

/// Extracts a job record from a job page of `source`
///
/// Returns None if title, company or description cannot be located.
pub fn extract_record(document: &str, url: &Url, source: Source) -> Option<JobRecord> {
    let document = Html::parse_document(document);
    rules_for(source).extract_record(&document, url)
}

/// Text of the first element matching `selector`
pub fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .map(element_text)
        .find(|text| !text.is_empty())
}

/// Text of the first `inner` element inside the first `container` element
pub fn select_text_within(document: &Html, container: &str, inner: &str) -> Option<String> {
    let container = Selector::parse(container).ok()?;
    let inner = Selector::parse(inner).ok()?;
    let root = document.select(&container).next()?;
    root.select(&inner).map(element_text).find(|t| !t.is_empty())
}

/// Text of the last `inner` element inside the first `container` element
pub fn select_last_text_within(document: &Html, container: &str, inner: &str) -> Option<String> {
    let container = Selector::parse(container).ok()?;
    let inner = Selector::parse(inner).ok()?;
    let root = document.select(&container).next()?;
    root.select(&inner)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .last()
}

/// Returns true if any element matches `selector`
pub fn has_element(document: &Html, selector: &str) -> bool {
    Selector::parse(selector)
        .map(|s| document.select(&s).next().is_some())
        .unwrap_or(false)
}

/// Resolves the `href` of every `link` element, optionally only inside `card`
/// elements
///
/// Results are canonical, in document order and de-duplicated.
pub fn select_links(document: &Html, card: Option<&str>, link: &str, page_url: &Url) -> Vec<Url> {
    let Ok(link_selector) = Selector::parse(link) else {
        return Vec::new();
    };

    let anchors: Vec<ElementRef<'_>> = match card.map(Selector::parse) {
        Some(Ok(card_selector)) => document
            .select(&card_selector)
            .flat_map(|card| card.select(&link_selector))
            .collect(),
        Some(Err(_)) => return Vec::new(),
        None => document.select(&link_selector).collect(),
    };

    let mut seen = HashSet::new();
    anchors
        .into_iter()
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| resolve_href(href, page_url))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// The `href` of the first element matching `selector`, resolved against
/// `page_url` without canonicalization
pub fn select_href(document: &Html, selector: &str, page_url: &Url) -> Option<Url> {
    let selector = Selector::parse(selector).ok()?;
    let href = document
        .select(&selector)
        .find_map(|element| element.value().attr("href"))?;
    page_url.join(href.trim()).ok()
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}
