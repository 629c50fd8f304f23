use crate::job::{Limit, Source};
use crate::ConfigResult;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Job-Trawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scraping: ScrapingConfig,
    pub keywords: KeywordsConfig,
    pub paths: PathsConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScrapingConfig {
    /// Source identifiers to crawl (e.g. "indeed", "glassdoor", "linkedin")
    pub sites: Vec<String>,

    /// Records per (source, keyword); -1 means unbounded
    pub max_jobs_per_site: i64,

    /// Minimum time between requests to the same source (seconds)
    #[serde(default = "default_request_delay")]
    pub request_delay_secs: f64,

    /// Outbound User-Agent header
    pub user_agent: String,

    /// Per-request HTTP timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Bounded wait for a rendered page's readiness condition (seconds)
    #[serde(default = "default_render_timeout")]
    pub render_timeout_secs: u64,

    /// Hard ceiling on listing pages (or scroll steps) per keyword
    #[serde(default = "default_max_pages")]
    pub max_pages_per_keyword: u32,

    /// Sources crawled at the same time
    #[serde(default = "default_max_concurrent_sources")]
    pub max_concurrent_sources: usize,

    /// WebDriver endpoint for rendered sources
    #[serde(default)]
    pub webdriver_url: Option<String>,
}

/// Search terms configuration
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordsConfig {
    pub keywords: Vec<String>,

    #[serde(default)]
    pub skills: Vec<String>,

    pub location: String,
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PathsConfig {
    /// Directory under which a timestamped run directory is created
    pub data_dir: String,
}

fn default_request_delay() -> f64 {
    2.0
}

fn default_request_timeout() -> u64 {
    30
}

fn default_render_timeout() -> u64 {
    20
}

fn default_max_pages() -> u32 {
    50
}

fn default_max_concurrent_sources() -> usize {
    3
}

impl Config {
    /// Parses the configured site identifiers, dropping duplicates
    pub fn sources(&self) -> ConfigResult<Vec<Source>> {
        let mut sources = Vec::new();
        for site in &self.scraping.sites {
            let source: Source = site.parse()?;
            if !sources.contains(&source) {
                sources.push(source);
            }
        }
        Ok(sources)
    }

    pub fn limit(&self) -> ConfigResult<Limit> {
        Limit::from_config(self.scraping.max_jobs_per_site)
    }
}

impl ScrapingConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs_f64(self.request_delay_secs.max(0.0))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }
}
