//! WebDriver-backed browser sessions (`webdriver` feature)
//!
//! Connects to a running WebDriver server (geckodriver, chromedriver) and
//! drives a headless Firefox session through `fantoccini`.

use crate::crawler::browser::{BrowserLauncher, BrowserSession};
use crate::{TrawlError, UrlError};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use std::time::Duration;

/// Launches headless sessions against a WebDriver endpoint
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    endpoint: String,
}

impl WebDriverLauncher {
    /// Fails if `endpoint` is not an http(s) URL
    pub fn new(endpoint: &str) -> Result<Self, TrawlError> {
        let url = url::Url::parse(endpoint)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()).into());
        }
        Ok(Self {
            endpoint: endpoint.to_string(),
        })
    }

    fn capabilities(user_agent: &str) -> Map<String, Value> {
        let mut caps = Map::new();
        caps.insert(
            "moz:firefoxOptions".to_string(),
            json!({
                "args": ["-headless"],
                "prefs": { "general.useragent.override": user_agent }
            }),
        );
        caps
    }
}

#[async_trait]
impl BrowserLauncher for WebDriverLauncher {
    async fn launch(&self, user_agent: &str) -> Result<Box<dyn BrowserSession>, TrawlError> {
        let client = ClientBuilder::rustls()
            .map_err(|e| TrawlError::Browser(e.to_string()))?
            .capabilities(Self::capabilities(user_agent))
            .connect(&self.endpoint)
            .await
            .map_err(|e| TrawlError::Browser(format!("{}: {}", self.endpoint, e)))?;

        tracing::debug!("WebDriver session opened at {}", self.endpoint);
        Ok(Box::new(WebDriverSession { client }))
    }
}

struct WebDriverSession {
    client: Client,
}

fn browser_err(e: impl std::fmt::Display) -> TrawlError {
    TrawlError::Browser(e.to_string())
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn open(&mut self, url: &str) -> Result<(), TrawlError> {
        self.client.goto(url).await.map_err(browser_err)
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), TrawlError> {
        self.client
            .execute("window.scrollTo(0, document.body.scrollHeight);", vec![])
            .await
            .map(|_| ())
            .map_err(browser_err)
    }

    async fn current_scrollable_height(&mut self) -> Result<u64, TrawlError> {
        let value = self
            .client
            .execute("return document.body.scrollHeight;", vec![])
            .await
            .map_err(browser_err)?;

        value
            .as_u64()
            .or_else(|| value.as_f64().map(|h| h.max(0.0) as u64))
            .ok_or_else(|| browser_err(format!("unexpected scroll height: {}", value)))
    }

    async fn wait_for_element(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, TrawlError> {
        match self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
        {
            Ok(_) => Ok(true),
            Err(fantoccini::error::CmdError::WaitTimeout) => Ok(false),
            Err(e) => Err(browser_err(e)),
        }
    }

    async fn click_if_visible(&mut self, selector: &str) -> Result<bool, TrawlError> {
        let element = match self.client.find(Locator::Css(selector)).await {
            Ok(element) => element,
            Err(e) if e.is_miss() => return Ok(false),
            Err(e) => return Err(browser_err(e)),
        };

        if !element.is_displayed().await.map_err(browser_err)? {
            return Ok(false);
        }

        element.click().await.map_err(browser_err)?;
        Ok(true)
    }

    async fn page_text(&mut self) -> Result<String, TrawlError> {
        self.client.source().await.map_err(browser_err)
    }

    async fn close(self: Box<Self>) -> Result<(), TrawlError> {
        self.client.close().await.map_err(browser_err)
    }
}
