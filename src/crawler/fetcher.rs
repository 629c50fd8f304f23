//! HTTP fetcher implementation
//!
//! A fetch is one GET with the configured identity and timeout. The fetcher
//! never retries; callers decide what a failure means for their loop.

use crate::FetchFailure;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// A fetched page
#[derive(Debug, Clone)]
pub struct Document {
    /// Final URL after redirects
    pub final_url: Url,

    /// Raw response body (HTML)
    pub body: String,
}

/// Static headers sent with every request alongside the user agent
const STATIC_HEADERS: &[(&str, &str)] = &[
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
    ),
    ("accept-language", "en-US,en;q=0.5"),
    ("referer", "https://www.google.com/"),
    ("dnt", "1"),
    ("upgrade-insecure-requests", "1"),
    ("cache-control", "max-age=0"),
];

/// Builds an HTTP client carrying the outbound identity
///
/// # Example
///
/// ```no_run
/// use job_trawl::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client("Mozilla/5.0 (X11; Linux x86_64)", Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    for &(name, value) in STATIC_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs single GET requests and classifies their failures
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent, timeout)?,
        })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetches `url` and returns its body, or the classified failure
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx | `Ok(Document)` |
    /// | any other status | `HttpStatus(code)` |
    /// | timeout, connect, DNS, body read error | `Network` |
    pub async fn fetch(&self, url: &Url) -> Result<Document, FetchFailure> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status));
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(classify_transport_error)?;

        Ok(Document { final_url, body })
    }
}

fn classify_status(status: StatusCode) -> FetchFailure {
    FetchFailure::HttpStatus(status.as_u16())
}

fn classify_transport_error(e: reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        FetchFailure::Network("request timeout".to_string())
    } else if e.is_connect() {
        FetchFailure::Network("connection failed".to_string())
    } else {
        FetchFailure::Network(e.to_string())
    }
}
