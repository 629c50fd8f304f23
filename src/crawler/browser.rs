//! Browser-automation contract for rendered sources
//!
//! The crawl engine never talks to a browser directly. A `BrowserLauncher`
//! produces one `BrowserSession` per crawl invocation; the adapter that
//! launched it owns it exclusively and releases it through
//! [`BrowserSession::close`], which consumes the session so it can only be
//! called once.

use crate::TrawlError;
use async_trait::async_trait;
use std::time::Duration;

/// One live rendered-page session
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigates to `url`
    async fn open(&mut self, url: &str) -> Result<(), TrawlError>;

    /// Scrolls the document to its current bottom
    async fn scroll_to_bottom(&mut self) -> Result<(), TrawlError>;

    /// Returns the document's scrollable height in pixels
    async fn current_scrollable_height(&mut self) -> Result<u64, TrawlError>;

    /// Waits up to `timeout` for an element matching `selector`
    ///
    /// Returns false if the element never appeared.
    async fn wait_for_element(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, TrawlError>;

    /// Clicks the first visible element matching `selector`
    ///
    /// Returns false if no such element is displayed.
    async fn click_if_visible(&mut self, selector: &str) -> Result<bool, TrawlError>;

    /// Returns the rendered document source
    async fn page_text(&mut self) -> Result<String, TrawlError>;

    /// Ends the session and releases the browser
    async fn close(self: Box<Self>) -> Result<(), TrawlError>;
}

/// Creates browser sessions
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Starts a new session presenting `user_agent`
    async fn launch(&self, user_agent: &str) -> Result<Box<dyn BrowserSession>, TrawlError>;
}
