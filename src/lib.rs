//! Job-Trawl: a polite multi-source job-posting crawler
//!
//! This crate paginates through job-listing sites for a set of keywords,
//! extracts uniform job records from the individual postings and hands them
//! to downstream consumers (persistence, term ranking) as one flat collection.

pub mod config;
pub mod crawler;
pub mod job;
pub mod output;
pub mod sources;
pub mod url;

use thiserror::Error;

/// Main error type for Job-Trawl operations
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch failed for {url}: {failure}")]
    Fetch { url: String, failure: FetchFailure },

    #[error("Required field missing on {url}")]
    ExtractionMiss { url: String },

    #[error("Listing page yielded no job links: {url}")]
    PageEmpty { url: String },

    #[error("Browser session unavailable for {source_id}: {message}")]
    SessionUnavailable { source_id: String, message: String },

    #[error("{source_id} cannot page with cursor {cursor}")]
    UnsupportedCursor { source_id: String, cursor: String },

    #[error("Browser command failed: {0}")]
    Browser(String),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Classified failure of a single fetch or render
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// Connection, DNS or transport timeout
    #[error("network failure: {0}")]
    Network(String),

    /// Non-2xx response
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Readiness condition never met (rendered pages only)
    #[error("render timeout waiting for {0}")]
    Timeout(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Unknown source: {0}")]
    UnknownSource(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Job-Trawl operations
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlOutcome, Orchestrator, SourceAdapter};
pub use job::{CrawlRequest, JobRecord, Limit, Source};
